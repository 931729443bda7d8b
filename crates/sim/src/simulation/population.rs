//! Populations of diploid organisms.
//!
//! A population keeps all chromosome pairs of one generation in a single
//! [`FlatArena`]: row `i` holds the `chromosome_pair_count` pairs of organism
//! `i`. Populations are built once per generation by [`Population::construct`]
//! and are read-only afterwards, serving as parents for the next generation.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use super::GenerationConfig;
use crate::base::{AncestryId, FlatArena, PopulationContext};
pub use crate::errors::PopulationError;
use crate::evolution::{IndexSampler, MatingEntry, RecombinationModel, SamplerCache};
use crate::genome::{ChromosomePair, Organism};

/// One generation's worth of organisms.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    population_size: usize,
    chromosome_pair_count: usize,
    pairs: FlatArena<ChromosomePair>,
}

/// A sampled parent: source population and organism index within it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Parent {
    population: usize,
    organism: usize,
    recombination_rate: Option<f64>,
}

impl Population {
    /// Population with no organisms.
    pub fn empty(chromosome_pair_count: usize) -> Self {
        Self {
            population_size: 0,
            chromosome_pair_count,
            pairs: FlatArena::allocate(0, chromosome_pair_count, ChromosomePair::founder(0, 0)),
        }
    }

    /// Population from pairs laid out organism after organism.
    ///
    /// # Errors
    /// `pairs.len()` must equal `population_size × chromosome_pair_count`.
    pub fn from_pairs(
        population_size: usize,
        chromosome_pair_count: usize,
        pairs: Vec<ChromosomePair>,
    ) -> Result<Self, PopulationError> {
        let expected = population_size * chromosome_pair_count;
        if pairs.len() != expected || (chromosome_pair_count == 0 && population_size > 0) {
            return Err(PopulationError::Configuration(format!(
                "{} chromosome pairs do not make {population_size} organisms of {chromosome_pair_count} pairs",
                pairs.len()
            )));
        }
        let pairs = FlatArena::from_items(pairs, chromosome_pair_count).ok_or_else(|| {
            PopulationError::Configuration("ragged chromosome pair layout".to_string())
        })?;
        Ok(Self {
            population_size,
            chromosome_pair_count,
            pairs,
        })
    }

    /// Founding population: organism `i` carries ancestry id
    /// `id_offset + 2i` on every maternal chromosome and `id_offset + 2i + 1`
    /// on every paternal chromosome.
    pub fn founders(
        population_size: usize,
        chromosome_pair_count: usize,
        id_offset: AncestryId,
    ) -> Result<Self, PopulationError> {
        if chromosome_pair_count == 0 {
            return Err(PopulationError::Configuration(
                "founding population needs a nonzero chromosome_pair_count".to_string(),
            ));
        }
        let last_id = u64::from(id_offset) + 2 * population_size as u64;
        if last_id > u64::from(AncestryId::MAX) + 1 {
            return Err(PopulationError::Configuration(format!(
                "ancestry ids from {id_offset} for {population_size} organisms overflow"
            )));
        }

        let mut pairs = Vec::with_capacity(population_size * chromosome_pair_count);
        for i in 0..population_size {
            let maternal_id = id_offset + 2 * i as AncestryId;
            pairs.extend(
                (0..chromosome_pair_count)
                    .map(|_| ChromosomePair::founder(maternal_id, maternal_id + 1)),
            );
        }
        Self::from_pairs(population_size, chromosome_pair_count, pairs)
    }

    /// Build one population of a new generation.
    ///
    /// With no parents this founds a population (see [`founders`](Self::founders)).
    /// Otherwise every offspring gets a mating entry drawn from the config's
    /// distribution, a mother and a father sampled from the entry's source
    /// populations, and one recombined gamete from each parent per chromosome
    /// pair.
    ///
    /// All checks run before the population is allocated: on error nothing is
    /// built. Parents are drawn sequentially from `rng`; gametes are built in
    /// parallel, each offspring with its own generator seeded from `rng`, so the
    /// result only depends on the seed.
    ///
    /// # Errors
    /// - [`PopulationError::Configuration`] for a zero chromosome pair count at
    ///   founding, out-of-range source populations, inconsistent chromosome
    ///   pair counts, or an entry that cannot avoid selfing
    /// - [`PopulationError::ContextCountMismatch`] and
    ///   [`PopulationError::SizeMismatch`] when contexts do not describe the
    ///   parents
    /// - [`PopulationError::Mating`] when no entry is viable
    pub fn construct<P, R>(
        config: &GenerationConfig,
        parents: &[P],
        contexts: &[PopulationContext],
        model: &RecombinationModel,
        rng: &mut R,
    ) -> Result<Self, PopulationError>
    where
        P: AsRef<Population> + Sync,
        R: Rng + ?Sized,
    {
        if parents.is_empty() {
            let population = Self::founders(
                config.population_size,
                config.chromosome_pair_count,
                config.id_offset,
            )?;
            log::debug!(
                "founded population of {} organisms with ids from {}",
                population.population_size,
                config.id_offset
            );
            return Ok(population);
        }

        check_contexts(parents, contexts)?;
        let mut mating = config.mating_distribution.clone();
        mating
            .check_population_indices(parents.len())
            .map_err(|e| PopulationError::Configuration(e.to_string()))?;
        let chromosome_pair_count = resolve_pair_count(config, parents, mating.entries());
        if config.population_size == 0 {
            return Ok(Self::empty(
                chromosome_pair_count.unwrap_or(config.chromosome_pair_count),
            ));
        }
        let chromosome_pair_count = chromosome_pair_count?;
        mating.validate(contexts)?;

        let mut samplers = SamplerCache::new(contexts, mating.default_fitness());
        let mut matings = Vec::with_capacity(config.population_size);
        for _ in 0..config.population_size {
            let entry = mating.draw_entry(rng)?;
            let (first_fitness, second_fitness) = mating.effective_fitness(entry);
            let mother_sampler = samplers.get(entry.first, first_fitness)?;
            let father_sampler = samplers.get(entry.second, second_fitness)?;

            let mother = mother_sampler.sample(rng);
            if entry.is_within_population() && father_sampler.sole_choice() == Some(mother) {
                return Err(PopulationError::Configuration(format!(
                    "mating entry {entry} needs two distinct parents but organism {mother} is the only selectable father in population {}",
                    entry.second
                )));
            }
            let father = loop {
                let father = father_sampler.sample(rng);
                if !entry.is_within_population() || father != mother {
                    break father;
                }
            };

            let rate = |sampler: &IndexSampler, organism: usize| {
                model
                    .rate_override
                    .and_then(|o| sampler.fitness_of(organism).map(|f| o.rate_for(f)))
            };
            matings.push((
                Parent {
                    population: entry.first,
                    organism: mother,
                    recombination_rate: rate(&*mother_sampler, mother),
                },
                Parent {
                    population: entry.second,
                    organism: father,
                    recombination_rate: rate(&*father_sampler, father),
                },
            ));
        }
        let seeds: Vec<u64> = (0..config.population_size).map(|_| rng.random()).collect();

        let mut pairs = FlatArena::allocate(
            config.population_size,
            chromosome_pair_count,
            ChromosomePair::founder(0, 0),
        );
        pairs
            .par_rows_mut()
            .zip(matings.par_iter())
            .zip(seeds.par_iter())
            .try_for_each(|((row, (mother, father)), &seed)| {
                let mut local_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                let mother_pairs = parents[mother.population]
                    .as_ref()
                    .organism(mother.organism)?;
                let father_pairs = parents[father.population]
                    .as_ref()
                    .organism(father.organism)?;

                for (index, child) in row.iter_mut().enumerate() {
                    let maternal = model.maternal.gamete(
                        &mother_pairs.pairs()[index],
                        index,
                        mother.recombination_rate,
                        &mut local_rng,
                    )?;
                    let paternal = model.paternal.gamete(
                        &father_pairs.pairs()[index],
                        index,
                        father.recombination_rate,
                        &mut local_rng,
                    )?;
                    *child = ChromosomePair::new(maternal, paternal);
                }
                Ok::<(), PopulationError>(())
            })?;

        log::debug!(
            "constructed population of {} organisms from {} parent population(s) using {} sampler(s)",
            config.population_size,
            parents.len(),
            samplers.len()
        );

        Ok(Self {
            population_size: config.population_size,
            chromosome_pair_count,
            pairs,
        })
    }

    /// Build every population of one generation from the previous one.
    pub fn create_populations<P, R>(
        configs: &[GenerationConfig],
        previous: &[P],
        contexts: &[PopulationContext],
        model: &RecombinationModel,
        rng: &mut R,
    ) -> Result<Vec<Population>, PopulationError>
    where
        P: AsRef<Population> + Sync,
        R: Rng + ?Sized,
    {
        configs
            .iter()
            .map(|config| Self::construct(config, previous, contexts, model, rng))
            .collect()
    }

    #[inline]
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    #[inline]
    pub fn chromosome_pair_count(&self) -> usize {
        self.chromosome_pair_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.population_size == 0
    }

    /// All chromosome pairs, organism after organism.
    #[inline]
    pub fn pairs(&self) -> &[ChromosomePair] {
        self.pairs.items()
    }

    /// View of organism `index`.
    pub fn organism(&self, index: usize) -> Result<Organism<'_>, PopulationError> {
        self.pairs
            .row(index)
            .map(Organism::new)
            .ok_or(PopulationError::OrganismIndexOutOfRange {
                index,
                size: self.population_size,
            })
    }

    /// Mutable chromosome pairs of organism `index`, for external edits such
    /// as mutation injection.
    pub fn organism_mut(&mut self, index: usize) -> Result<&mut [ChromosomePair], PopulationError> {
        let size = self.population_size;
        self.pairs
            .row_mut(index)
            .ok_or(PopulationError::OrganismIndexOutOfRange { index, size })
    }

    /// Organisms in index order.
    pub fn organisms(&self) -> impl ExactSizeIterator<Item = Organism<'_>> + '_ {
        self.pairs.iter_rows().map(Organism::new)
    }

    /// Organisms as a parallel iterator, in index order.
    pub fn par_organisms(&self) -> impl IndexedParallelIterator<Item = Organism<'_>> + '_ {
        self.pairs.par_iter_rows().map(Organism::new)
    }

    /// Mean number of segments per chromosome, 0 for an empty population.
    pub fn mean_segment_count(&self) -> f64 {
        let chromosomes = 2 * self.pairs.items().len();
        if chromosomes == 0 {
            return 0.0;
        }
        let segments: usize = self
            .pairs
            .items()
            .par_iter()
            .map(|p| p.maternal.segment_count() + p.paternal.segment_count())
            .sum();
        segments as f64 / chromosomes as f64
    }

    /// Mean segments per chromosome for each chromosome pair index.
    pub fn mean_segment_counts_by_pair(&self) -> Vec<f64> {
        if self.population_size == 0 {
            return vec![0.0; self.chromosome_pair_count];
        }
        let mut totals = vec![0usize; self.chromosome_pair_count];
        for organism in self.organisms() {
            for (total, pair) in totals.iter_mut().zip(organism.pairs()) {
                *total += pair.maternal.segment_count() + pair.paternal.segment_count();
            }
        }
        let chromosomes = 2 * self.population_size;
        totals
            .into_iter()
            .map(|t| t as f64 / chromosomes as f64)
            .collect()
    }
}

impl AsRef<Population> for Population {
    fn as_ref(&self) -> &Population {
        self
    }
}

fn check_contexts<P: AsRef<Population>>(
    parents: &[P],
    contexts: &[PopulationContext],
) -> Result<(), PopulationError> {
    if parents.len() != contexts.len() {
        return Err(PopulationError::ContextCountMismatch {
            populations: parents.len(),
            contexts: contexts.len(),
        });
    }
    for (i, (parent, context)) in parents.iter().zip(contexts).enumerate() {
        let actual = parent.as_ref().population_size();
        if actual != context.population_size() {
            return Err(PopulationError::SizeMismatch {
                population: i,
                expected: context.population_size(),
                actual,
            });
        }
    }
    Ok(())
}

/// Chromosome pair count of the offspring: the config's, or the one shared
/// by every parent population the entries refer to.
fn resolve_pair_count<P: AsRef<Population>>(
    config: &GenerationConfig,
    parents: &[P],
    entries: &[MatingEntry],
) -> Result<usize, PopulationError> {
    let mut count = (config.chromosome_pair_count != 0).then_some(config.chromosome_pair_count);
    for population in entries.iter().flat_map(|e| [e.first, e.second]) {
        let parent_count = parents[population].as_ref().chromosome_pair_count();
        match count {
            None => count = Some(parent_count),
            Some(c) if c != parent_count => {
                return Err(PopulationError::Configuration(format!(
                    "population {population} has {parent_count} chromosome pairs, expected {c}"
                )));
            }
            Some(_) => {}
        }
    }
    count.filter(|&c| c > 0).ok_or_else(|| {
        PopulationError::Configuration(
            "cannot determine a nonzero chromosome_pair_count".to_string(),
        )
    })
}

/// Shared ownership of a population, as held between generations.
pub type SharedPopulation = Arc<Population>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MatingError;
    use crate::evolution::{
        GeneratorConfig, MatingDistribution, PositionGenerator, RecombinationConfig,
    };
    use rand::SeedableRng;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(42)
    }

    fn distribution(text: &str) -> MatingDistribution {
        text.parse().unwrap()
    }

    fn contexts_for(parents: &[Population]) -> Vec<PopulationContext> {
        parents
            .iter()
            .map(|p| PopulationContext::new(p.population_size()))
            .collect()
    }

    #[test]
    fn test_founders() {
        let config = GenerationConfig::founder(10, 1).with_id_offset(1000);
        let population = Population::construct::<Population, _>(
            &config,
            &[],
            &[],
            &RecombinationModel::trivial(),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(population.population_size(), 10);
        let organism = population.organism(6).unwrap();
        let pair = organism.pair(0).unwrap();
        assert_eq!(pair.maternal.segments().len(), 1);
        assert_eq!(pair.maternal.coordinate_lookup(0), 1012);
        assert_eq!(pair.paternal.coordinate_lookup(12345), 1013);
    }

    #[test]
    fn test_founders_ids_unique_across_pairs() {
        let population = Population::founders(3, 2, 0).unwrap();
        for (i, organism) in population.organisms().enumerate() {
            for pair in organism.pairs() {
                assert_eq!(pair.maternal.ancestry_ids(), vec![2 * i as u32]);
                assert_eq!(pair.paternal.ancestry_ids(), vec![2 * i as u32 + 1]);
            }
        }
    }

    #[test]
    fn test_founders_need_pair_count() {
        let config = GenerationConfig::founder(10, 0);
        let result = Population::construct::<Population, _>(
            &config,
            &[],
            &[],
            &RecombinationModel::trivial(),
            &mut rng(),
        );
        assert!(matches!(result, Err(PopulationError::Configuration(_))));
    }

    #[test]
    fn test_founders_id_overflow() {
        assert!(Population::founders(10, 1, u32::MAX - 5).is_err());
        assert!(Population::founders(3, 1, u32::MAX - 5).is_ok());
    }

    #[test]
    fn test_offspring_inherit_pair_count() {
        let parents = vec![Population::founders(10, 3, 0).unwrap()];
        let config = GenerationConfig::offspring(20, distribution("{<1|0,0>}"));
        let child = Population::construct(
            &config,
            &parents,
            &contexts_for(&parents),
            &RecombinationModel::trivial(),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(child.population_size(), 20);
        assert_eq!(child.chromosome_pair_count(), 3);
        assert_eq!(child.pairs().len(), 60);
    }

    #[test]
    fn test_no_selfing() {
        let parents = vec![Population::founders(2, 1, 0).unwrap()];
        let config = GenerationConfig::offspring(200, distribution("{<1|0,0>}"));
        let child = Population::construct(
            &config,
            &parents,
            &contexts_for(&parents),
            &RecombinationModel::trivial(),
            &mut rng(),
        )
        .unwrap();

        // with trivial recombination each chromosome is a whole parental chromosome;
        // organism 0 carries ids 0/1 and organism 1 carries ids 2/3
        for organism in child.organisms() {
            let pair = organism.pair(0).unwrap();
            let mother = pair.maternal.coordinate_lookup(0) / 2;
            let father = pair.paternal.coordinate_lookup(0) / 2;
            assert_ne!(mother, father);
        }
    }

    #[test]
    fn test_selfing_impossible_is_configuration_error() {
        let parents = vec![Population::founders(1, 1, 0).unwrap()];
        let config = GenerationConfig::offspring(5, distribution("{<1|0,0>}"));
        let result = Population::construct(
            &config,
            &parents,
            &contexts_for(&parents),
            &RecombinationModel::trivial(),
            &mut rng(),
        );
        assert!(matches!(result, Err(PopulationError::Configuration(_))));
    }

    #[test]
    fn test_distinct_single_parents_within_population() {
        let parents = vec![Population::founders(3, 1, 0).unwrap()];
        let contexts = vec![PopulationContext::new(3)
            .with_trait("mom", vec![0.0, 1.0, 0.0])
            .with_trait("dad", vec![1.0, 0.0, 0.0])];
        let config = GenerationConfig::offspring(20, distribution("{<1|0,mom,0,dad>}"));
        let child = Population::construct(
            &config,
            &parents,
            &contexts,
            &RecombinationModel::trivial(),
            &mut rng(),
        )
        .unwrap();

        // organism 1 carries ids 2/3, organism 0 carries ids 0/1
        for organism in child.organisms() {
            let pair = organism.pair(0).unwrap();
            assert_eq!(pair.maternal.coordinate_lookup(0) / 2, 1);
            assert_eq!(pair.paternal.coordinate_lookup(0) / 2, 0);
        }
    }

    #[test]
    fn test_same_single_parent_within_population_rejected() {
        let parents = vec![Population::founders(3, 1, 0).unwrap()];
        let contexts = vec![PopulationContext::new(3)
            .with_trait("mom", vec![0.0, 1.0, 1.0])
            .with_trait("dad", vec![0.0, 1.0, 0.0])];
        let config = GenerationConfig::offspring(50, distribution("{<1|0,mom,0,dad>}"));
        let result = Population::construct(
            &config,
            &parents,
            &contexts,
            &RecombinationModel::trivial(),
            &mut rng(),
        );
        assert!(matches!(result, Err(PopulationError::Configuration(_))));
    }

    #[test]
    fn test_fitness_restricts_father() {
        let parents = vec![
            Population::founders(10, 1, 0).unwrap(),
            Population::founders(10, 1, 1000).unwrap(),
        ];
        let mut special = vec![0.0; 10];
        special[0] = 1.0;
        let contexts = vec![
            PopulationContext::new(10).with_trait("fitness", vec![1.0; 10]),
            PopulationContext::new(10)
                .with_trait("fitness", vec![1.0; 10])
                .with_trait("fitness_special", special),
        ];
        let config = GenerationConfig::offspring(
            50,
            distribution("{<1|0,fitness,1,fitness_special>}"),
        );
        let model = RecombinationConfig::symmetric(GeneratorConfig::uniform(3.0))
            .initialize(&[1_000_000])
            .unwrap();
        let child = Population::construct(&config, &parents, &contexts, &model, &mut rng())
            .unwrap();

        for organism in child.organisms() {
            let paternal = &organism.pair(0).unwrap().paternal;
            for id in paternal.ancestry_ids() {
                assert!(id == 1000 || id == 1001, "unexpected id {id}");
            }
            for p in [0, 250_000, 999_999] {
                assert!(paternal.coordinate_lookup(p) >= 1000);
            }
        }
    }

    #[test]
    fn test_context_mismatches() {
        let parents = vec![Population::founders(4, 1, 0).unwrap()];
        let config = GenerationConfig::offspring(4, distribution("{<1|0,0>}"));
        let model = RecombinationModel::trivial();

        let result = Population::construct(&config, &parents, &[], &model, &mut rng());
        assert!(matches!(
            result,
            Err(PopulationError::ContextCountMismatch {
                populations: 1,
                contexts: 0
            })
        ));

        let result = Population::construct(
            &config,
            &parents,
            &[PopulationContext::new(5)],
            &model,
            &mut rng(),
        );
        assert!(matches!(result, Err(PopulationError::SizeMismatch { .. })));
    }

    #[test]
    fn test_entry_index_out_of_range() {
        let parents = vec![Population::founders(4, 1, 0).unwrap()];
        let config = GenerationConfig::offspring(4, distribution("{<1|0,1>}"));
        let result = Population::construct(
            &config,
            &parents,
            &contexts_for(&parents),
            &RecombinationModel::trivial(),
            &mut rng(),
        );
        assert!(matches!(result, Err(PopulationError::Configuration(_))));
    }

    #[test]
    fn test_no_viable_entries() {
        let parents = vec![Population::founders(4, 1, 0).unwrap()];
        let contexts = vec![PopulationContext::new(4).with_trait("fitness", vec![0.0; 4])];
        let config = GenerationConfig::offspring(4, distribution("{<1|0,fitness,0,fitness>}"));
        let result = Population::construct(
            &config,
            &parents,
            &contexts,
            &RecombinationModel::trivial(),
            &mut rng(),
        );
        assert!(matches!(
            result,
            Err(PopulationError::Mating(MatingError::NoViableEntries))
        ));
    }

    #[test]
    fn test_mismatched_parent_pair_counts() {
        let parents = vec![
            Population::founders(4, 1, 0).unwrap(),
            Population::founders(4, 2, 100).unwrap(),
        ];
        let config = GenerationConfig::offspring(4, distribution("{<1|0,1>}"));
        let result = Population::construct(
            &config,
            &parents,
            &contexts_for(&parents),
            &RecombinationModel::trivial(),
            &mut rng(),
        );
        assert!(matches!(result, Err(PopulationError::Configuration(_))));
    }

    #[test]
    fn test_recombination_index_error_surfaces() {
        let parents = vec![Population::founders(4, 2, 0).unwrap()];
        let config = GenerationConfig::offspring(4, distribution("{<1|0,0>}"));
        // generator initialized for one chromosome only
        let model = RecombinationModel::symmetric(
            GeneratorConfig::SingleCrossover.initialize(&[100]).unwrap(),
        );
        let result = Population::construct(
            &config,
            &parents,
            &contexts_for(&parents),
            &model,
            &mut rng(),
        );
        assert!(matches!(result, Err(PopulationError::Recombination(_))));
    }

    #[test]
    fn test_construct_is_deterministic() {
        let parents = vec![Population::founders(20, 2, 0).unwrap()];
        let config = GenerationConfig::offspring(30, distribution("{<1|0,0>}"));
        let model = RecombinationModel::symmetric(
            GeneratorConfig::uniform(2.0)
                .initialize(&[10_000, 10_000])
                .unwrap(),
        );
        let contexts = contexts_for(&parents);
        let a = Population::construct(&config, &parents, &contexts, &model, &mut rng()).unwrap();
        let b = Population::construct(&config, &parents, &contexts, &model, &mut rng()).unwrap();
        assert_eq!(a, b);
        assert!(a.mean_segment_count() > 1.0);
    }

    #[test]
    fn test_rate_override_from_fitness() {
        let parents = vec![Population::founders(10, 1, 0).unwrap()];
        let contexts = vec![PopulationContext::new(10).with_trait("fitness", vec![1.0; 10])];
        let config = GenerationConfig::offspring(50, distribution("{<1|0,fitness,0,fitness>}"));

        let quiet = RecombinationConfig::symmetric(GeneratorConfig::uniform(0.0))
            .initialize(&[1_000_000])
            .unwrap();
        let child =
            Population::construct(&config, &parents, &contexts, &quiet, &mut rng()).unwrap();
        assert_eq!(child.mean_segment_count(), 1.0);

        let busy = RecombinationConfig::symmetric(GeneratorConfig::uniform(0.0))
            .with_rate_override(10.0)
            .initialize(&[1_000_000])
            .unwrap();
        let child = Population::construct(&config, &parents, &contexts, &busy, &mut rng()).unwrap();
        assert!(child.mean_segment_count() > 5.0);
    }

    #[test]
    fn test_zero_size_offspring() {
        let parents = vec![Population::founders(4, 2, 0).unwrap()];
        let config = GenerationConfig::offspring(0, distribution("{<1|0,0>}"));
        let child = Population::construct(
            &config,
            &parents,
            &contexts_for(&parents),
            &RecombinationModel::trivial(),
            &mut rng(),
        )
        .unwrap();
        assert!(child.is_empty());
        assert_eq!(child.chromosome_pair_count(), 2);
        assert_eq!(child.organisms().count(), 0);
    }

    #[test]
    fn test_create_populations() {
        let configs = vec![
            GenerationConfig::founder(5, 1),
            GenerationConfig::founder(3, 1).with_id_offset(10),
        ];
        let populations = Population::create_populations::<Population, _>(
            &configs,
            &[],
            &[],
            &RecombinationModel::trivial(),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(populations.len(), 2);
        assert_eq!(populations[1].organism(0).unwrap().pairs()[0].maternal.coordinate_lookup(0), 10);
    }

    #[test]
    fn test_organism_access() {
        let mut population = Population::founders(3, 2, 0).unwrap();
        assert!(matches!(
            population.organism(3),
            Err(PopulationError::OrganismIndexOutOfRange { index: 3, size: 3 })
        ));

        let pairs = population.organism_mut(1).unwrap();
        pairs[0] = ChromosomePair::founder(77, 78);
        assert_eq!(
            population.organism(1).unwrap().pair(0).unwrap().maternal.coordinate_lookup(0),
            77
        );
        assert_eq!(population.par_organisms().count(), 3);
    }

    #[test]
    fn test_from_pairs_checks_layout() {
        let pairs = vec![ChromosomePair::founder(0, 1); 3];
        assert!(Population::from_pairs(2, 2, pairs.clone()).is_err());
        assert!(Population::from_pairs(3, 1, pairs).is_ok());
    }

    #[test]
    fn test_mean_segment_counts_by_pair() {
        let parents = vec![Population::founders(10, 2, 0).unwrap()];
        let config = GenerationConfig::offspring(10, distribution("{<1|0,0>}"));
        let model = RecombinationModel::new(
            PositionGenerator::Composite {
                default: Box::new(PositionGenerator::Trivial),
                overrides: [(
                    1,
                    GeneratorConfig::uniform(20.0).initialize(&[10_000, 10_000]).unwrap(),
                )]
                .into_iter()
                .collect(),
            },
            PositionGenerator::Trivial,
        );
        let child = Population::construct(
            &config,
            &parents,
            &contexts_for(&parents),
            &model,
            &mut rng(),
        )
        .unwrap();
        let by_pair = child.mean_segment_counts_by_pair();
        assert_eq!(by_pair[0], 1.0);
        assert!(by_pair[1] > 1.0);
    }
}
