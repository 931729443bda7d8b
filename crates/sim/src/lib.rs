//! # Lineage Simulation Crate
//!
//! Forward-time simulation of diploid populations that tracks, for every
//! chromosome, which founder each stretch of sequence descends from.
//! It includes modules for ancestry chromosomes and genotypes, recombination,
//! mating and parent selection, population construction, persistence, and
//! the simulation engine.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod simulation;
pub mod storage;
pub mod prelude;

pub use base::{AncestryId, Position, Segment};
pub use genome::{Chromosome, ChromosomePair};
