use serde::{Deserialize, Serialize};

use super::Chromosome;
use crate::base::AncestryId;

/// Maternal and paternal copies of one chromosome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromosomePair {
    pub maternal: Chromosome,
    pub paternal: Chromosome,
    /// Per-pair recombination rate used in place of the generator's own rate
    /// when this pair is the source of a gamete. Only rate-driven generators
    /// honor it. Not persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recombination_rate: Option<f64>,
}

impl ChromosomePair {
    pub fn new(maternal: Chromosome, paternal: Chromosome) -> Self {
        Self {
            maternal,
            paternal,
            recombination_rate: None,
        }
    }

    /// Both chromosomes inherited whole from founder lineages.
    pub fn founder(maternal_id: AncestryId, paternal_id: AncestryId) -> Self {
        Self::new(
            Chromosome::founder(maternal_id),
            Chromosome::founder(paternal_id),
        )
    }

    /// Chromosome by haplotype index: 0 is maternal, 1 is paternal.
    #[inline]
    pub fn haplotype(&self, which: usize) -> Option<&Chromosome> {
        match which {
            0 => Some(&self.maternal),
            1 => Some(&self.paternal),
            _ => None,
        }
    }
}

/// Pairs compare by chromosomes only; the transient rate override is ignored.
impl PartialEq for ChromosomePair {
    fn eq(&self, other: &Self) -> bool {
        self.maternal == other.maternal && self.paternal == other.paternal
    }
}

impl Eq for ChromosomePair {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_founder_pair() {
        let pair = ChromosomePair::founder(4, 5);
        assert_eq!(pair.maternal, Chromosome::founder(4));
        assert_eq!(pair.paternal, Chromosome::founder(5));
        assert_eq!(pair.recombination_rate, None);
    }

    #[test]
    fn test_haplotype_index() {
        let pair = ChromosomePair::founder(1, 2);
        assert_eq!(pair.haplotype(0).unwrap().coordinate_lookup(0), 1);
        assert_eq!(pair.haplotype(1).unwrap().coordinate_lookup(0), 2);
        assert!(pair.haplotype(2).is_none());
    }

    #[test]
    fn test_equality_ignores_rate() {
        let a = ChromosomePair::founder(1, 2);
        let mut b = a.clone();
        b.recombination_rate = Some(3.0);
        assert_eq!(a, b);
        assert_ne!(a, ChromosomePair::founder(2, 1));
    }
}
