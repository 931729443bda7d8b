//! Non-uniform recombination from a genetic map.
//!
//! A map is a list of records giving, for increasing physical positions, the
//! cumulative genetic distance in centimorgans. The number of crossovers per
//! meiosis is Poisson with mean `total cM / 100`, truncated at
//! [`MAX_EVENTS`]. Each crossover lands in a map interval with probability
//! proportional to its genetic length and uniformly within that interval.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::base::Position;
use crate::errors::RecombinationError;

/// Largest number of crossovers drawn for one gamete.
pub const MAX_EVENTS: usize = 10;

/// One row of a genetic map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    /// Physical position.
    pub position: Position,
    /// Local rate in cM/Mb. Informational only.
    #[serde(default)]
    pub combined_rate: f64,
    /// Cumulative genetic distance in cM.
    pub genetic_map: f64,
}

impl MapRecord {
    pub fn new(position: Position, combined_rate: f64, genetic_map: f64) -> Self {
        Self {
            position,
            combined_rate,
            genetic_map,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecombinationMap {
    records: Vec<MapRecord>,
    /// `event_cdf[k]` is P(count <= k).
    event_cdf: Vec<f64>,
}

impl RecombinationMap {
    /// Build a map from records sorted by position.
    ///
    /// # Errors
    /// The record list must be non-empty, with strictly increasing positions and
    /// a finite, non-decreasing, non-negative genetic map.
    pub fn from_records(records: Vec<MapRecord>) -> Result<Self, RecombinationError> {
        let last = records.last().ok_or(RecombinationError::EmptyMap)?;

        for w in records.windows(2) {
            if w[1].position <= w[0].position {
                return Err(RecombinationError::InvalidMap(format!(
                    "positions not increasing ({} then {})",
                    w[0].position, w[1].position
                )));
            }
            if w[1].genetic_map < w[0].genetic_map {
                return Err(RecombinationError::InvalidMap(format!(
                    "genetic map decreases at position {}",
                    w[1].position
                )));
            }
        }
        if let Some(r) = records
            .iter()
            .find(|r| !r.genetic_map.is_finite() || r.genetic_map < 0.0)
        {
            return Err(RecombinationError::InvalidMap(format!(
                "invalid genetic map value {} at position {}",
                r.genetic_map, r.position
            )));
        }

        let rate = last.genetic_map * 0.01;
        let mut event_cdf = Vec::with_capacity(MAX_EVENTS);
        let mut term = (-rate).exp();
        let mut total = 0.0;
        for k in 0..MAX_EVENTS {
            if k > 0 {
                term *= rate / k as f64;
            }
            total += term;
            event_cdf.push(total);
        }

        Ok(Self { records, event_cdf })
    }

    #[inline]
    pub fn records(&self) -> &[MapRecord] {
        &self.records
    }

    /// Expected number of crossovers per meiosis.
    #[inline]
    pub fn expected_events(&self) -> f64 {
        self.total_genetic_length() * 0.01
    }

    /// Total genetic length in cM.
    #[inline]
    pub fn total_genetic_length(&self) -> f64 {
        self.records.last().map_or(0.0, |r| r.genetic_map)
    }

    /// Draw crossover positions for one gamete. Not sorted.
    pub fn random_positions<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Position> {
        let roll = rng.random::<f64>();
        let count = self.event_cdf.partition_point(|&c| c < roll);
        (0..count).filter_map(|_| self.random_position(rng)).collect()
    }

    /// Draw one crossover position, or `None` if the map has zero length.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let max = self.total_genetic_length();
        if max <= 0.0 {
            return None;
        }
        let roll = rng.random_range(0.0..max);

        // first record strictly past the roll; exists because roll < max
        let i = self.records.partition_point(|r| r.genetic_map <= roll);
        let range_end = self.records[i].position;
        let range_begin = if i == 0 {
            0
        } else {
            self.records[i - 1].position
        };

        Some(if range_begin < range_end {
            rng.random_range(range_begin..range_end)
        } else {
            range_begin
        })
    }
}
