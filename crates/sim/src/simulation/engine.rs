//! Simulation engine.
//!
//! The engine walks a [`GenerationPlan`] one generation at a time. Before
//! building generation `g + 1` it asks a [`TraitEvaluator`] for the trait
//! values of every population of generation `g`; only then are the new
//! populations constructed. The previous generation is held in `Arc`s until
//! the whole new generation exists and is released afterwards.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{GenerationPlan, Population, SimulationConfig};
use crate::base::{PopulationContext, Position};
pub use crate::errors::SimulationError;
use crate::evolution::RecombinationModel;

/// Supplies per-organism trait values for a finished population.
///
/// This is the seam to the trait and fitness layer: the returned context
/// holds the vectors that mating entries refer to by fitness id.
pub trait TraitEvaluator {
    fn evaluate(
        &mut self,
        generation: usize,
        population_index: usize,
        population: &Population,
    ) -> Result<PopulationContext, String>;
}

/// No traits at all: parents are chosen uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralEvaluator;

impl TraitEvaluator for NeutralEvaluator {
    fn evaluate(
        &mut self,
        _generation: usize,
        _population_index: usize,
        population: &Population,
    ) -> Result<PopulationContext, String> {
        Ok(PopulationContext::new(population.population_size()))
    }
}

impl<F> TraitEvaluator for F
where
    F: FnMut(usize, usize, &Population) -> Result<PopulationContext, String>,
{
    fn evaluate(
        &mut self,
        generation: usize,
        population_index: usize,
        population: &Population,
    ) -> Result<PopulationContext, String> {
        self(generation, population_index, population)
    }
}

/// Main simulation engine.
#[derive(Debug)]
pub struct Simulation<E = NeutralEvaluator> {
    plan: GenerationPlan,
    chromosome_lengths: Vec<Position>,
    model: RecombinationModel,
    evaluator: E,
    /// Random number generator (Xoshiro256++)
    rng: Xoshiro256PlusPlus,
    /// Number of generations built so far.
    generation: usize,
    populations: Vec<Arc<Population>>,
    contexts: Vec<PopulationContext>,
}

impl Simulation<NeutralEvaluator> {
    /// Neutral simulation from a configuration.
    pub fn from_config(config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::with_evaluator(config, NeutralEvaluator)
    }
}

impl<E: TraitEvaluator> Simulation<E> {
    /// Simulation from a configuration, with trait values supplied by `evaluator`.
    ///
    /// The configuration is validated and the recombination generators are
    /// initialized here; the first generation is built by the first
    /// [`step`](Self::step).
    pub fn with_evaluator(config: SimulationConfig, evaluator: E) -> Result<Self, SimulationError> {
        config.validate()?;
        let model = config.recombination.initialize(&config.chromosome_lengths)?;

        let rng = match config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
        };

        let mut plan = config.generations;
        if let Some(fitness) = &config.default_fitness {
            for generation in plan.generations_mut() {
                for population in generation.iter_mut() {
                    let distribution = &mut population.mating_distribution;
                    if distribution.default_fitness().is_none() {
                        distribution.set_default_fitness(Some(fitness.clone()));
                    }
                }
            }
        }

        log::info!(
            "simulation set up: {} generations, {} chromosome(s), seed {:?}",
            plan.len(),
            config.chromosome_lengths.len(),
            config.seed
        );

        Ok(Self {
            plan,
            chromosome_lengths: config.chromosome_lengths,
            model,
            evaluator,
            rng,
            generation: 0,
            populations: Vec::new(),
            contexts: Vec::new(),
        })
    }

    /// Build the next generation of the plan.
    ///
    /// # Errors
    /// [`SimulationError::PlanExhausted`] once every generation is built, an
    /// evaluation error from the trait layer, or a population construction
    /// error. On error the current generation is left untouched.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        if self.is_finished() {
            return Err(SimulationError::PlanExhausted(self.plan.len()));
        }
        let contexts = if self.generation == 0 {
            Vec::new()
        } else {
            self.evaluate_current()?
        };
        let configs = self
            .plan
            .generation(self.generation)
            .ok_or(SimulationError::PlanExhausted(self.plan.len()))?;

        let next = Population::create_populations(
            configs,
            &self.populations,
            &contexts,
            &self.model,
            &mut self.rng,
        )?;

        // parents are released only now that the whole generation exists
        self.populations = next.into_iter().map(Arc::new).collect();
        self.contexts = contexts;
        self.generation += 1;

        log::info!(
            "generation {} built: {} population(s), {} organisms",
            self.generation - 1,
            self.populations.len(),
            self.populations
                .iter()
                .map(|p| p.population_size())
                .sum::<usize>()
        );
        Ok(())
    }

    fn evaluate_current(&mut self) -> Result<Vec<PopulationContext>, SimulationError> {
        let generation = self.generation - 1;
        self.populations
            .iter()
            .enumerate()
            .map(|(index, population)| {
                self.evaluator
                    .evaluate(generation, index, population)
                    .map_err(|message| SimulationError::Evaluation {
                        population: index,
                        message,
                    })
            })
            .collect()
    }

    /// Build every remaining generation.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        while !self.is_finished() {
            self.step()?;
        }
        Ok(())
    }

    /// Build up to `generations` more generations, stopping early at the end
    /// of the plan. Returns the number built.
    pub fn run_for(&mut self, generations: usize) -> Result<usize, SimulationError> {
        let mut built = 0;
        while built < generations && !self.is_finished() {
            self.step()?;
            built += 1;
        }
        Ok(built)
    }

    /// Number of generations built so far.
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Whether every generation of the plan has been built.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.generation >= self.plan.len()
    }

    /// Populations of the most recent generation.
    #[inline]
    pub fn populations(&self) -> &[Arc<Population>] {
        &self.populations
    }

    /// Trait values the most recent generation was bred from. Empty after the
    /// founding generation.
    #[inline]
    pub fn parent_contexts(&self) -> &[PopulationContext] {
        &self.contexts
    }

    #[inline]
    pub fn plan(&self) -> &GenerationPlan {
        &self.plan
    }

    #[inline]
    pub fn chromosome_lengths(&self) -> &[Position] {
        &self.chromosome_lengths
    }

    #[inline]
    pub fn model(&self) -> &RecombinationModel {
        &self.model
    }

    #[inline]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Get the current RNG state for checkpointing.
    pub fn rng_state_bytes(&self) -> Result<Vec<u8>, SimulationError> {
        bincode::serialize(&self.rng).map_err(|e| SimulationError::RngState(e.to_string()))
    }

    /// Restore the RNG state saved by [`rng_state_bytes`](Self::rng_state_bytes).
    pub fn set_rng_from_bytes(&mut self, bytes: &[u8]) -> Result<(), SimulationError> {
        self.rng =
            bincode::deserialize(bytes).map_err(|e| SimulationError::RngState(e.to_string()))?;
        Ok(())
    }
}
