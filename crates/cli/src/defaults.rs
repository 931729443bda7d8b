//! Shared default values for command-line options.

use lineage_sim::base::Position;
use lineage_sim::simulation::DEFAULT_CHROMOSOME_LENGTH;

pub const OUTPUT: &str = "population.txt";

pub const POPULATION_SIZE: usize = 100;
pub const GENERATIONS: usize = 100;

pub const CHROMOSOME_LENGTHS: &[Position] = &[DEFAULT_CHROMOSOME_LENGTH];

/// Text form accepted by `GeneratorConfig::from_str`.
pub const RECOMBINATION: &str = "uniform=1";
