//! Mating distribution.
//!
//! A generation's mating setup is a weighted list of entries. Each entry names
//! the source population of the mother and of the father, and optionally the
//! trait used as fitness when choosing an organism from each of them. Drawing
//! an entry picks one such recipe with probability proportional to its weight.
//!
//! Text form: `{<weight|pop_a,fitness_a,pop_b,fitness_b>...}`, where an empty
//! fitness means uniform choice. The short entry form `<weight|pop_a,pop_b>`
//! is also accepted when parsing.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::base::PopulationContext;
pub use crate::errors::MatingError;

/// Number of rejection-sampling attempts before [`MatingDistribution::draw_entry`]
/// gives up.
pub const MAX_DRAW_ATTEMPTS: usize = 10_000;

/// One weighted mating recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatingEntry {
    pub weight: f64,
    /// Source population of the mother.
    pub first: usize,
    #[serde(default)]
    pub first_fitness: Option<String>,
    /// Source population of the father.
    pub second: usize,
    #[serde(default)]
    pub second_fitness: Option<String>,
    /// Cleared by [`MatingDistribution::validate`] when a side has no viable parent.
    #[serde(skip, default = "valid_by_default")]
    pub valid: bool,
}

fn valid_by_default() -> bool {
    true
}

impl MatingEntry {
    /// Entry with uniform parent choice on both sides.
    pub fn new(weight: f64, first: usize, second: usize) -> Self {
        Self {
            weight,
            first,
            first_fitness: None,
            second,
            second_fitness: None,
            valid: true,
        }
    }

    pub fn with_fitness(
        mut self,
        first_fitness: impl Into<String>,
        second_fitness: impl Into<String>,
    ) -> Self {
        self.first_fitness = non_empty(first_fitness.into());
        self.second_fitness = non_empty(second_fitness.into());
        self
    }

    /// Whether both parents come from the same population.
    #[inline]
    pub fn is_within_population(&self) -> bool {
        self.first == self.second
    }
}

/// Entries compare by populations and fitness ids; weight is compared through
/// the cumulative weights of the enclosing distribution.
impl PartialEq for MatingEntry {
    fn eq(&self, other: &Self) -> bool {
        self.first == other.first
            && self.first_fitness == other.first_fitness
            && self.second == other.second
            && self.second_fitness == other.second_fitness
    }
}

impl fmt::Display for MatingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}|{},{},{},{}>",
            self.weight,
            self.first,
            self.first_fitness.as_deref().unwrap_or(""),
            self.second,
            self.second_fitness.as_deref().unwrap_or("")
        )
    }
}

impl FromStr for MatingEntry {
    type Err = MatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || MatingError::Parse(format!("invalid entry '{s}'"));

        let inner = s
            .trim()
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(bad)?;
        let (weight, rest) = inner.split_once('|').ok_or_else(bad)?;
        let weight: f64 = weight.trim().parse().map_err(|_| bad())?;

        let fields: Vec<&str> = rest.split(',').map(str::trim).collect();
        let index = |field: &str| field.parse::<usize>().map_err(|_| bad());
        let (first, first_fitness, second, second_fitness) = match fields.as_slice() {
            [a, b] => (index(a)?, "", index(b)?, ""),
            [a, fa, b, fb] => (index(a)?, *fa, index(b)?, *fb),
            _ => return Err(bad()),
        };

        Ok(MatingEntry::new(weight, first, second).with_fitness(first_fitness, second_fitness))
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// Weighted list of mating entries with a running sum of weights.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatingDistribution {
    entries: Vec<MatingEntry>,
    cumulative_weights: Vec<f64>,
    /// Fitness id used for a side whose entry leaves it unset.
    default_fitness: Option<String>,
}

impl MatingDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single entry of weight 1: both parents drawn uniformly from `population`.
    pub fn random_mating(population: usize) -> Self {
        Self {
            entries: vec![MatingEntry::new(1.0, population, population)],
            cumulative_weights: vec![1.0],
            default_fitness: None,
        }
    }

    /// Set the fitness id applied to entry sides without one.
    pub fn with_default_fitness(mut self, fitness: impl Into<String>) -> Self {
        self.set_default_fitness(Some(fitness.into()));
        self
    }

    pub fn set_default_fitness(&mut self, fitness: Option<String>) {
        self.default_fitness = fitness.and_then(non_empty);
    }

    #[inline]
    pub fn default_fitness(&self) -> Option<&str> {
        self.default_fitness.as_deref()
    }

    /// Add an entry and extend the cumulative weights.
    ///
    /// # Errors
    /// Weights must be finite and non-negative.
    pub fn append(&mut self, entry: MatingEntry) -> Result<(), MatingError> {
        if !entry.weight.is_finite() || entry.weight < 0.0 {
            return Err(MatingError::InvalidWeight(entry.weight));
        }
        self.cumulative_weights
            .push(self.total_weight() + entry.weight);
        self.entries.push(entry);
        Ok(())
    }

    /// Builder-style [`append`](Self::append).
    pub fn with_entry(mut self, entry: MatingEntry) -> Result<Self, MatingError> {
        self.append(entry)?;
        Ok(self)
    }

    #[inline]
    pub fn entries(&self) -> &[MatingEntry] {
        &self.entries
    }

    #[inline]
    pub fn cumulative_weights(&self) -> &[f64] {
        &self.cumulative_weights
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights, 0 when empty.
    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.cumulative_weights.last().copied().unwrap_or(0.0)
    }

    /// Fitness ids in effect for the mother and father side of `entry`.
    pub fn effective_fitness<'a>(
        &'a self,
        entry: &'a MatingEntry,
    ) -> (Option<&'a str>, Option<&'a str>) {
        let default = self.default_fitness();
        (
            entry.first_fitness.as_deref().or(default),
            entry.second_fitness.as_deref().or(default),
        )
    }

    /// Check that every entry refers to one of `count` parent populations.
    pub fn check_population_indices(&self, count: usize) -> Result<(), MatingError> {
        match self
            .entries
            .iter()
            .map(|e| e.first.max(e.second))
            .find(|&index| index >= count)
        {
            Some(index) => Err(MatingError::PopulationIndexOutOfRange { index, count }),
            None => Ok(()),
        }
    }

    /// Mark entries without a viable parent as invalid.
    ///
    /// A side is not viable when its fitness vector is entirely zero. Entries
    /// are re-evaluated from scratch on every call.
    ///
    /// # Errors
    /// Fails on out-of-range population indices, on fitness ids missing from
    /// the referenced context, and when no entry remains valid.
    pub fn validate(&mut self, contexts: &[PopulationContext]) -> Result<(), MatingError> {
        self.check_population_indices(contexts.len())?;

        let default = self.default_fitness.as_deref();
        let viable = |population: usize, fitness: Option<&str>| -> Result<bool, MatingError> {
            let Some(trait_id) = fitness.or(default) else {
                return Ok(true);
            };
            contexts[population]
                .is_all_zero(trait_id)
                .map(|all_zero| !all_zero)
                .ok_or_else(|| MatingError::MissingTrait {
                    population,
                    trait_id: trait_id.to_string(),
                })
        };

        let mut any_valid = false;
        let mut verdicts = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let valid = viable(entry.first, entry.first_fitness.as_deref())?
                && viable(entry.second, entry.second_fitness.as_deref())?;
            if !valid {
                log::warn!("marking invalid mating entry {entry}");
            }
            any_valid |= valid;
            verdicts.push(valid);
        }
        for (entry, valid) in self.entries.iter_mut().zip(verdicts) {
            entry.valid = valid;
        }

        if any_valid {
            Ok(())
        } else {
            Err(MatingError::NoViableEntries)
        }
    }

    /// Draw an entry with probability proportional to its weight, skipping
    /// invalid entries.
    ///
    /// Zero-weight entries are never drawn.
    ///
    /// # Errors
    /// [`MatingError::NoViableEntries`] if the total weight is zero, and
    /// [`MatingError::AttemptsExhausted`] after [`MAX_DRAW_ATTEMPTS`] draws
    /// that all landed on invalid entries.
    pub fn draw_entry<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&MatingEntry, MatingError> {
        let total = self.total_weight();
        if total <= 0.0 {
            return Err(MatingError::NoViableEntries);
        }
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let roll = rng.random_range(0.0..total);
            // first entry whose cumulative weight exceeds the roll
            let index = self.cumulative_weights.partition_point(|&c| c <= roll);
            if let Some(entry) = self.entries.get(index) {
                if entry.valid {
                    return Ok(entry);
                }
            }
        }
        Err(MatingError::AttemptsExhausted(MAX_DRAW_ATTEMPTS))
    }
}

/// Same entries and cumulative weights within 1e-12.
impl PartialEq for MatingDistribution {
    fn eq(&self, other: &Self) -> bool {
        const EPSILON: f64 = 1e-12;
        self.entries == other.entries
            && self
                .cumulative_weights
                .iter()
                .zip(&other.cumulative_weights)
                .all(|(a, b)| (a - b).abs() <= EPSILON)
    }
}

impl fmt::Display for MatingDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for entry in &self.entries {
            write!(f, "{entry}")?;
        }
        write!(f, "}}")
    }
}

impl FromStr for MatingDistribution {
    type Err = MatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| MatingError::Parse(format!("expected '{{...}}', found '{s}'")))?;

        let mut distribution = MatingDistribution::new();
        for piece in inner.split_inclusive('>') {
            if piece.trim().is_empty() {
                continue;
            }
            distribution.append(piece.parse()?)?;
        }
        Ok(distribution)
    }
}

impl TryFrom<String> for MatingDistribution {
    type Error = MatingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MatingDistribution> for String {
    fn from(distribution: MatingDistribution) -> Self {
        distribution.to_string()
    }
}
