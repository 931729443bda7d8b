//! Builder pattern for creating simulations.
//!
//! Provides a fluent API over [`SimulationConfig`] with defaults for
//! everything except the generation plan.

use super::engine::{Simulation, TraitEvaluator};
use super::configs::DEFAULT_CHROMOSOME_LENGTH;
use super::{GenerationPlan, SimulationConfig};
use crate::base::Position;
pub use crate::errors::SimulationError;
use crate::evolution::{GeneratorConfig, RateOverride, RecombinationConfig};

/// Builder for constructing [`Simulation`] instances with a fluent API.
///
/// # Examples
///
/// ```
/// use lineage_sim::evolution::GeneratorConfig;
/// use lineage_sim::simulation::SimulationBuilder;
///
/// // Two chromosomes, 50 organisms, 10 generations of random mating
/// let mut sim = SimulationBuilder::new()
///     .chromosome_lengths(vec![1_000_000, 500_000])
///     .random_mating(50, 10)
///     .recombination(GeneratorConfig::uniform(1.0))
///     .seed(42)
///     .build()
///     .unwrap();
/// sim.run().unwrap();
/// assert_eq!(sim.populations()[0].population_size(), 50);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    chromosome_lengths: Option<Vec<Position>>,
    plan: Option<GenerationPlan>,
    // (population size, offspring generations), expanded once the lengths are known
    random_mating: Option<(usize, usize)>,
    maternal: Option<GeneratorConfig>,
    paternal: Option<GeneratorConfig>,
    rate_override: Option<f64>,
    seed: Option<u64>,
    default_fitness: Option<String>,
}

impl SimulationBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chromosome lengths in base pairs (default: a single 100 Mb chromosome).
    pub fn chromosome_lengths(mut self, lengths: Vec<Position>) -> Self {
        self.chromosome_lengths = Some(lengths);
        self
    }

    /// Use an explicit generation plan.
    pub fn generation_plan(mut self, plan: GenerationPlan) -> Self {
        self.plan = Some(plan);
        self.random_mating = None;
        self
    }

    /// One randomly mating population of constant size: a founding generation
    /// followed by `generations` offspring generations.
    pub fn random_mating(mut self, population_size: usize, generations: usize) -> Self {
        self.random_mating = Some((population_size, generations));
        self.plan = None;
        self
    }

    /// Same generator for maternal and paternal gametes.
    pub fn recombination(mut self, generator: GeneratorConfig) -> Self {
        self.maternal = Some(generator.clone());
        self.paternal = Some(generator);
        self
    }

    pub fn maternal_recombination(mut self, generator: GeneratorConfig) -> Self {
        self.maternal = Some(generator);
        self
    }

    pub fn paternal_recombination(mut self, generator: GeneratorConfig) -> Self {
        self.paternal = Some(generator);
        self
    }

    /// Derive per-parent crossover rates from parent fitness times `scale`.
    pub fn rate_override(mut self, scale: f64) -> Self {
        self.rate_override = Some(scale);
        self
    }

    /// Set the random seed for reproducibility (default: None = random).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Trait id used by mating entries that name no fitness of their own.
    pub fn default_fitness(mut self, trait_id: impl Into<String>) -> Self {
        self.default_fitness = Some(trait_id.into());
        self
    }

    /// Assemble and validate the configuration without building the engine.
    pub fn config(self) -> Result<SimulationConfig, SimulationError> {
        let chromosome_lengths = self
            .chromosome_lengths
            .unwrap_or_else(|| vec![DEFAULT_CHROMOSOME_LENGTH]);

        let generations = match (self.plan, self.random_mating) {
            (Some(plan), _) => plan,
            (None, Some((size, generations))) => {
                GenerationPlan::random_mating(size, chromosome_lengths.len(), generations)
            }
            (None, None) => {
                return Err(SimulationError::Setup(
                    "a generation plan or random mating setup is required".to_string(),
                ))
            }
        };

        let trivial = GeneratorConfig::Trivial;
        let recombination = RecombinationConfig {
            maternal: self.maternal.unwrap_or_else(|| trivial.clone()),
            paternal: self.paternal.unwrap_or(trivial),
            rate_override: self.rate_override.map(|scale| RateOverride { scale }),
        };

        let config = SimulationConfig {
            seed: self.seed,
            chromosome_lengths,
            generations,
            recombination,
            default_fitness: self.default_fitness,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build and validate a neutral simulation.
    pub fn build(self) -> Result<Simulation, SimulationError> {
        Simulation::from_config(self.config()?)
    }

    /// Build and validate a simulation whose trait values come from `evaluator`.
    pub fn build_with_evaluator<E: TraitEvaluator>(
        self,
        evaluator: E,
    ) -> Result<Simulation<E>, SimulationError> {
        Simulation::with_evaluator(self.config()?, evaluator)
    }
}
