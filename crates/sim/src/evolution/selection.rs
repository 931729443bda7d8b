//! Fitness-proportional choice of parent organisms.
//!
//! An [`IndexSampler`] draws organism indices from one source population,
//! either uniformly or with probability proportional to a fitness vector.
//! Samplers are built lazily per `(population, fitness id)` through a
//! [`SamplerCache`], which lives for exactly one generation's construction
//! since fitness values change every generation.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use crate::base::PopulationContext;
pub use crate::errors::{SamplerCacheError, SelectionError};

/// Draws organism indices from a population.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexSampler {
    /// Every organism equally likely.
    Uniform { population_size: usize },
    /// Probability proportional to fitness.
    Weighted {
        fitness: Arc<[f64]>,
        cumulative: Vec<f64>,
    },
}

impl IndexSampler {
    /// Uniform sampler over `population_size` organisms.
    pub fn uniform(population_size: usize) -> Result<Self, SelectionError> {
        if population_size == 0 {
            return Err(SelectionError::EmptyPopulation);
        }
        Ok(Self::Uniform { population_size })
    }

    /// Fitness-proportional sampler.
    ///
    /// # Errors
    /// The vector must have one finite, non-negative value per organism and a
    /// positive sum.
    pub fn weighted(fitness: Arc<[f64]>, population_size: usize) -> Result<Self, SelectionError> {
        if population_size == 0 {
            return Err(SelectionError::EmptyPopulation);
        }
        if fitness.len() != population_size {
            return Err(SelectionError::LengthMismatch {
                expected: population_size,
                found: fitness.len(),
            });
        }

        let mut cumulative = Vec::with_capacity(fitness.len());
        let mut total = 0.0;
        for (index, &value) in fitness.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(SelectionError::InvalidFitness { index, value });
            }
            total += value;
            cumulative.push(total);
        }
        if total <= 0.0 {
            return Err(SelectionError::ZeroTotalFitness);
        }

        Ok(Self::Weighted {
            fitness,
            cumulative,
        })
    }

    /// Draw one organism index.
    ///
    /// Organisms with zero fitness are never drawn.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            Self::Uniform { population_size } => rng.random_range(0..*population_size),
            Self::Weighted { cumulative, .. } => {
                let max = cumulative.last().copied().unwrap_or(0.0);
                let roll = rng.random_range(0.0..max);
                // first organism whose cumulative fitness exceeds the roll
                cumulative
                    .partition_point(|&c| c <= roll)
                    .min(cumulative.len() - 1)
            }
        }
    }

    /// Fitness of organism `index`, or `None` for a uniform sampler.
    #[inline]
    pub fn fitness_of(&self, index: usize) -> Option<f64> {
        match self {
            Self::Uniform { .. } => None,
            Self::Weighted { fitness, .. } => fitness.get(index).copied(),
        }
    }

    /// Number of organisms that can be drawn.
    pub fn support(&self) -> usize {
        match self {
            Self::Uniform { population_size } => *population_size,
            Self::Weighted { fitness, .. } => fitness.iter().filter(|&&f| f > 0.0).count(),
        }
    }

    /// The one organism this sampler can draw, if its support is a single
    /// organism.
    pub fn sole_choice(&self) -> Option<usize> {
        match self {
            Self::Uniform { population_size: 1 } => Some(0),
            Self::Uniform { .. } => None,
            Self::Weighted { fitness, .. } => {
                let mut drawable = fitness.iter().enumerate().filter(|(_, f)| **f > 0.0);
                match (drawable.next(), drawable.next()) {
                    (Some((index, _)), None) => Some(index),
                    _ => None,
                }
            }
        }
    }

    /// Size of the population sampled from.
    pub fn population_size(&self) -> usize {
        match self {
            Self::Uniform { population_size } => *population_size,
            Self::Weighted { cumulative, .. } => cumulative.len(),
        }
    }
}

/// Lazily built samplers for one generation, keyed by source population and
/// effective fitness id.
#[derive(Debug)]
pub struct SamplerCache<'a> {
    contexts: &'a [PopulationContext],
    default_fitness: Option<&'a str>,
    samplers: HashMap<(usize, Option<String>), Arc<IndexSampler>>,
}

impl<'a> SamplerCache<'a> {
    pub fn new(contexts: &'a [PopulationContext], default_fitness: Option<&'a str>) -> Self {
        Self {
            contexts,
            default_fitness,
            samplers: HashMap::new(),
        }
    }

    /// Sampler for `population` under `fitness` (or the default fitness id).
    ///
    /// # Errors
    /// Fails if `population` is out of range, if the fitness id is not present
    /// in its context, or if the sampler cannot be built.
    pub fn get(
        &mut self,
        population: usize,
        fitness: Option<&str>,
    ) -> Result<Arc<IndexSampler>, SamplerCacheError> {
        let fitness = fitness.or(self.default_fitness);
        let key = (population, fitness.map(str::to_string));
        if let Some(sampler) = self.samplers.get(&key) {
            return Ok(Arc::clone(sampler));
        }

        let context = self
            .contexts
            .get(population)
            .ok_or(SamplerCacheError::PopulationIndexOutOfRange {
                index: population,
                count: self.contexts.len(),
            })?;
        let size = context.population_size();
        let sampler = match fitness {
            None => IndexSampler::uniform(size)?,
            Some(trait_id) => {
                let values = context.trait_values(trait_id).ok_or_else(|| {
                    SamplerCacheError::MissingTrait {
                        population,
                        trait_id: trait_id.to_string(),
                    }
                })?;
                IndexSampler::weighted(Arc::clone(values), size)?
            }
        };

        let sampler = Arc::new(sampler);
        self.samplers.insert(key, Arc::clone(&sampler));
        Ok(sampler)
    }

    /// Number of samplers built so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(42)
    }

    #[test]
    fn test_uniform_covers_range() {
        let sampler = IndexSampler::uniform(5).unwrap();
        let mut rng = rng();
        let mut seen = [false; 5];
        for _ in 0..1000 {
            seen[sampler.sample(&mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(sampler.support(), 5);
        assert_eq!(sampler.fitness_of(0), None);
    }

    #[test]
    fn test_zero_fitness_suffix_never_drawn() {
        let fitness: Arc<[f64]> = vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0].into();
        let sampler = IndexSampler::weighted(fitness, 9).unwrap();
        let mut rng = rng();
        for _ in 0..100_000 {
            assert!(sampler.sample(&mut rng) < 5);
        }
        assert_eq!(sampler.support(), 5);
    }

    #[test]
    fn test_sole_choice() {
        assert_eq!(IndexSampler::uniform(1).unwrap().sole_choice(), Some(0));
        assert_eq!(IndexSampler::uniform(3).unwrap().sole_choice(), None);
        let single: Arc<[f64]> = vec![0.0, 0.0, 0.5].into();
        assert_eq!(IndexSampler::weighted(single, 3).unwrap().sole_choice(), Some(2));
        let pair: Arc<[f64]> = vec![0.0, 1.0, 0.5].into();
        assert_eq!(IndexSampler::weighted(pair, 3).unwrap().sole_choice(), None);
    }

    #[test]
    fn test_zero_fitness_prefix_never_drawn() {
        let fitness: Arc<[f64]> = vec![0.0, 0.0, 2.0, 0.0, 1.0].into();
        let sampler = IndexSampler::weighted(fitness, 5).unwrap();
        let mut rng = rng();
        let mut counts = [0usize; 5];
        for _ in 0..30_000 {
            counts[sampler.sample(&mut rng)] += 1;
        }
        assert_eq!(counts[0] + counts[1] + counts[3], 0);
        let ratio = counts[2] as f64 / counts[4] as f64;
        assert!((ratio - 2.0).abs() < 0.15, "ratio {ratio}");
        assert_eq!(sampler.fitness_of(2), Some(2.0));
    }

    #[test]
    fn test_weighted_errors() {
        let v = |x: Vec<f64>| -> Arc<[f64]> { x.into() };
        assert_eq!(
            IndexSampler::weighted(v(vec![1.0]), 2),
            Err(SelectionError::LengthMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            IndexSampler::weighted(v(vec![0.0, 0.0]), 2),
            Err(SelectionError::ZeroTotalFitness)
        );
        assert_eq!(
            IndexSampler::weighted(v(vec![1.0, -1.0]), 2),
            Err(SelectionError::InvalidFitness {
                index: 1,
                value: -1.0
            })
        );
        assert_eq!(IndexSampler::uniform(0), Err(SelectionError::EmptyPopulation));
    }

    #[test]
    fn test_cache_memoizes_by_effective_fitness() {
        let contexts = vec![PopulationContext::new(3).with_trait("fitness", vec![1.0, 2.0, 3.0])];
        let mut cache = SamplerCache::new(&contexts, Some("fitness"));

        let a = cache.get(0, None).unwrap();
        let b = cache.get(0, Some("fitness")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert!(matches!(*a, IndexSampler::Weighted { .. }));
    }

    #[test]
    fn test_cache_errors() {
        let contexts = vec![PopulationContext::new(3)];
        let mut cache = SamplerCache::new(&contexts, None);
        assert!(matches!(*cache.get(0, None).unwrap(), IndexSampler::Uniform { .. }));
        assert_eq!(
            cache.get(1, None).unwrap_err(),
            SamplerCacheError::PopulationIndexOutOfRange { index: 1, count: 1 }
        );
        assert_eq!(
            cache.get(0, Some("fitness")).unwrap_err(),
            SamplerCacheError::MissingTrait {
                population: 0,
                trait_id: "fitness".to_string()
            }
        );
    }
}
