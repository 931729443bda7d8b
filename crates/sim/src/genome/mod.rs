//! Genome structures: ancestry chromosomes, chromosome pairs, organism views,
//! and genotype resolution.

mod chromosome;
pub mod genotype;
mod organism;
mod pair;

pub use chromosome::Chromosome;
pub use genotype::{
    Coordinate, Genotype, GenotypeData, GenotypeMap, Genotyper, VariantResolver,
};
pub use organism::Organism;
pub use pair::ChromosomePair;
