//! Simulation engine and population management.
//!
//! - `GenerationPlan` / `GenerationConfig`: what each generation looks like
//!   and where its parents come from.
//! - `Population`: flat storage of the chromosome pairs of one population,
//!   plus offspring construction.
//! - `Simulation`: the engine that walks the plan generation by generation.
//! - `SimulationBuilder`: fluent builder for constructing `Simulation`
//!   instances with defaults and validation.

pub mod builder;
pub mod configs;
pub mod engine;
pub mod population;

pub use builder::SimulationBuilder;
pub use configs::{GenerationConfig, GenerationPlan, SimulationConfig, DEFAULT_CHROMOSOME_LENGTH};
pub use engine::{NeutralEvaluator, Simulation, TraitEvaluator};
pub use population::{Population, SharedPopulation};
