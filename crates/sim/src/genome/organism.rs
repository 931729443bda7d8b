use std::fmt;

use super::{ChromosomePair, Coordinate};
use crate::base::AncestryId;

/// Read-only view of one diploid individual.
///
/// Organisms are not stored on their own: a population keeps every
/// chromosome pair in one flat arena and an organism is the row of
/// `chromosome_pair_count` pairs at its index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Organism<'a> {
    pairs: &'a [ChromosomePair],
}

impl<'a> Organism<'a> {
    #[inline]
    pub fn new(pairs: &'a [ChromosomePair]) -> Self {
        Self { pairs }
    }

    #[inline]
    pub fn pairs(&self) -> &'a [ChromosomePair] {
        self.pairs
    }

    #[inline]
    pub fn pair(&self, index: usize) -> Option<&'a ChromosomePair> {
        self.pairs.get(index)
    }

    /// Number of chromosome pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Ancestry ids of both haplotypes at a coordinate.
    pub fn ancestry_at(&self, coordinate: Coordinate) -> Option<(AncestryId, AncestryId)> {
        self.pair(coordinate.chromosome_pair_index).map(|pair| {
            (
                pair.maternal.coordinate_lookup(coordinate.position),
                pair.paternal.coordinate_lookup(coordinate.position),
            )
        })
    }

    /// Total number of segments across all chromosomes.
    pub fn segment_count(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| p.maternal.segment_count() + p.paternal.segment_count())
            .sum()
    }
}

impl fmt::Display for Organism<'_> {
    /// One `+` line and one `-` line per pair.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pair in self.pairs {
            writeln!(f, "+ {}", pair.maternal)?;
            writeln!(f, "- {}", pair.paternal)?;
        }
        Ok(())
    }
}
