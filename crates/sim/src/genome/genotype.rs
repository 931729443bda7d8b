//! Genotype resolution.
//!
//! A chromosome only records which founder lineage each position came from.
//! Turning that into allele values needs an external [`VariantResolver`] that
//! knows the allele carried by lineage `id` at a coordinate. The [`Genotyper`]
//! looks up both haplotypes of an organism and packs the two alleles into a
//! single byte.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::Organism;
use crate::base::{AncestryId, Position};
use crate::errors::GenotypeError;
use crate::simulation::Population;

/// A genome location: chromosome pair index plus position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub chromosome_pair_index: usize,
    pub position: Position,
}

impl Coordinate {
    #[inline]
    pub fn new(chromosome_pair_index: usize, position: Position) -> Self {
        Self {
            chromosome_pair_index,
            position,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.chromosome_pair_index, self.position)
    }
}

/// Maps an ancestry id at a coordinate to an allele value.
///
/// Any `Fn(AncestryId, &Coordinate) -> u32` closure is a resolver.
pub trait VariantResolver: Sync {
    fn resolve(&self, ancestry_id: AncestryId, coordinate: &Coordinate) -> u32;
}

impl<F> VariantResolver for F
where
    F: Fn(AncestryId, &Coordinate) -> u32 + Sync,
{
    #[inline]
    fn resolve(&self, ancestry_id: AncestryId, coordinate: &Coordinate) -> u32 {
        self(ancestry_id, coordinate)
    }
}

/// Two alleles packed in one byte: first allele in the high nibble, second in
/// the low nibble. `0x11` is a homozygote for allele 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Genotype(u8);

impl Genotype {
    /// Largest allele value a packed genotype can hold.
    pub const MAX_ALLELE: u32 = 0x0F;

    /// Pack two alleles.
    pub fn new(first: u32, second: u32) -> Result<Self, GenotypeError> {
        for allele in [first, second] {
            if allele > Self::MAX_ALLELE {
                return Err(GenotypeError::AlleleOutOfRange(allele));
            }
        }
        Ok(Self(((first as u8) << 4) | second as u8))
    }

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn first(self) -> u8 {
        self.0 >> 4
    }

    #[inline]
    pub fn second(self) -> u8 {
        self.0 & 0x0F
    }

    /// Sum of both alleles; the dosage (0, 1 or 2) for 0/1 markers.
    #[inline]
    pub fn dosage(self) -> u8 {
        self.first() + self.second()
    }
}

/// Genotypes for every organism of a population at one coordinate, in
/// organism order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeData(Vec<Genotype>);

impl GenotypeData {
    pub fn new(genotypes: Vec<Genotype>) -> Self {
        Self(genotypes)
    }

    #[inline]
    pub fn genotypes(&self) -> &[Genotype] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Frequency of allele 1, assuming 0/1 alleles. `NaN` when empty.
    pub fn allele_frequency(&self) -> f64 {
        let sum: u64 = self.0.iter().map(|g| u64::from(g.dosage())).sum();
        sum as f64 / self.0.len() as f64 / 2.0
    }

    /// Dosages in organism order.
    pub fn dosages(&self) -> Vec<u8> {
        self.0.iter().map(|g| g.dosage()).collect()
    }
}

/// Genotype data keyed by coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenotypeMap(BTreeMap<Coordinate, GenotypeData>);

impl GenotypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coordinate: Coordinate, data: GenotypeData) {
        self.0.insert(coordinate, data);
    }

    /// Data at `coordinate`, or an error naming the missing coordinate.
    pub fn get(&self, coordinate: &Coordinate) -> Result<&GenotypeData, GenotypeError> {
        self.0
            .get(coordinate)
            .ok_or(GenotypeError::MissingCoordinate(*coordinate))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &GenotypeData)> {
        self.0.iter()
    }
}

/// Resolves genotypes of organisms and populations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Genotyper;

impl Genotyper {
    pub fn new() -> Self {
        Self
    }

    /// Genotype of one organism at one coordinate.
    pub fn resolve<V: VariantResolver + ?Sized>(
        &self,
        coordinate: &Coordinate,
        organism: &Organism<'_>,
        resolver: &V,
    ) -> Result<Genotype, GenotypeError> {
        let (maternal, paternal) =
            organism
                .ancestry_at(*coordinate)
                .ok_or(GenotypeError::PairIndexOutOfRange {
                    index: coordinate.chromosome_pair_index,
                    count: organism.len(),
                })?;

        Genotype::new(
            resolver.resolve(maternal, coordinate),
            resolver.resolve(paternal, coordinate),
        )
    }

    /// Genotypes of every organism in `population` at each coordinate.
    ///
    /// Organisms are resolved in parallel; each vector is in organism order.
    pub fn resolve_batch<'c, V, I>(
        &self,
        coordinates: I,
        population: &Population,
        resolver: &V,
    ) -> Result<GenotypeMap, GenotypeError>
    where
        V: VariantResolver + ?Sized,
        I: IntoIterator<Item = &'c Coordinate>,
    {
        let mut map = GenotypeMap::new();
        for coordinate in coordinates {
            let genotypes = population
                .par_organisms()
                .map(|organism| self.resolve(coordinate, &organism, resolver))
                .collect::<Result<Vec<_>, _>>()?;
            map.insert(*coordinate, GenotypeData::new(genotypes));
        }
        Ok(map)
    }
}
