//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use lineage_sim::prelude::*;
//!
//! let chromosome: Chromosome = "{ (0,1) (50,2) }".parse().unwrap();
//! assert_eq!(chromosome.coordinate_lookup(60), 2);
//! ```

pub use crate::errors;
pub use crate::base::{AncestryId, PopulationContext, Position, Segment};
pub use crate::evolution::{
    GeneratorConfig, MatingDistribution, MatingEntry, PositionGenerator, RecombinationConfig,
    RecombinationModel,
};
pub use crate::genome::{Chromosome, ChromosomePair, Coordinate, Genotype, Genotyper, Organism};
pub use crate::simulation::{
    GenerationConfig, GenerationPlan, Population, Simulation, SimulationBuilder, SimulationConfig,
    TraitEvaluator,
};
pub use crate::storage::PopulationFormat;
