//! Recombination position generators.
//!
//! A generator produces the sorted breakpoints for one gamete of one
//! chromosome pair. The gamete starts copying from the maternal chromosome of
//! the parent and switches at every breakpoint, so a leading breakpoint at 0
//! means "start from the paternal chromosome". Every variant adds that leading
//! 0 with probability ½, which makes the starting parent an independent coin
//! flip per gamete.
//!
//! Generators come in two stages. A [`GeneratorConfig`] is the serializable
//! description; [`GeneratorConfig::initialize`] binds it to the chromosome
//! lengths and yields a [`PositionGenerator`] ready to draw from.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use super::recombination_map::{MapRecord, RecombinationMap};
use crate::base::Position;
pub use crate::errors::RecombinationError;
use crate::genome::{Chromosome, ChromosomePair};

fn default_rate() -> f64 {
    1.0
}

/// Serializable description of a position generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// No crossovers; only the starting parent is random.
    Trivial,
    /// At most one crossover, with probability ½, uniform along the chromosome.
    SingleCrossover,
    /// Poisson number of crossovers placed uniformly.
    Uniform {
        /// Expected crossovers per meiosis, used for every chromosome.
        #[serde(default = "default_rate")]
        rate: f64,
        /// Per-chromosome rates; overrides `rate` when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rates: Option<Vec<f64>>,
    },
    /// Crossovers drawn from one genetic map per chromosome.
    RecombinationMap { maps: Vec<Vec<MapRecord>> },
    /// Distinct generators for selected chromosomes.
    Composite {
        /// Used for chromosomes without an explicit entry. Trivial if omitted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Box<GeneratorConfig>>,
        #[serde(default)]
        chromosomes: Vec<ChromosomeGenerator>,
    },
}

/// Composite entry: a generator for one chromosome, numbered from 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromosomeGenerator {
    pub chromosome: usize,
    pub generator: GeneratorConfig,
}

impl GeneratorConfig {
    /// Uniform generator with the same rate on every chromosome.
    pub fn uniform(rate: f64) -> Self {
        Self::Uniform { rate, rates: None }
    }

    /// Bind the description to the chromosome lengths.
    ///
    /// # Errors
    /// Fails on zero lengths, invalid rates, rate/chromosome count mismatch,
    /// malformed maps, and invalid composite chromosome numbers.
    pub fn initialize(&self, lengths: &[Position]) -> Result<PositionGenerator, RecombinationError> {
        match self {
            Self::Trivial => Ok(PositionGenerator::Trivial),
            Self::SingleCrossover => {
                check_lengths(lengths)?;
                Ok(PositionGenerator::SingleCrossover {
                    lengths: lengths.to_vec(),
                })
            }
            Self::Uniform { rate, rates } => {
                check_lengths(lengths)?;
                let rates = rates.clone().unwrap_or_else(|| vec![*rate; lengths.len()]);
                if rates.len() != lengths.len() {
                    return Err(RecombinationError::RateCountMismatch {
                        rates: rates.len(),
                        chromosomes: lengths.len(),
                    });
                }
                for &r in &rates {
                    check_rate(r)?;
                }
                Ok(PositionGenerator::Uniform {
                    chromosomes: lengths
                        .iter()
                        .zip(rates)
                        .map(|(&length, rate)| UniformChromosome { length, rate })
                        .collect(),
                })
            }
            Self::RecombinationMap { maps } => Ok(PositionGenerator::RecombinationMap {
                maps: maps
                    .iter()
                    .map(|records| RecombinationMap::from_records(records.clone()))
                    .collect::<Result<_, _>>()?,
            }),
            Self::Composite {
                default,
                chromosomes,
            } => {
                let default = match default {
                    Some(config) => config.initialize(lengths)?,
                    None => PositionGenerator::Trivial,
                };
                let mut overrides = HashMap::with_capacity(chromosomes.len());
                for entry in chromosomes {
                    if entry.chromosome == 0 {
                        return Err(RecombinationError::ZeroChromosomeNumber);
                    }
                    let index = entry.chromosome - 1;
                    if index >= lengths.len() {
                        return Err(RecombinationError::ChromosomeIndexOutOfRange {
                            index,
                            count: lengths.len(),
                        });
                    }
                    if overrides.contains_key(&index) {
                        return Err(RecombinationError::DuplicateChromosome(entry.chromosome));
                    }
                    overrides.insert(index, entry.generator.initialize(lengths)?);
                }
                Ok(PositionGenerator::Composite {
                    default: Box::new(default),
                    overrides,
                })
            }
        }
    }
}

impl fmt::Display for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trivial => write!(f, "trivial"),
            Self::SingleCrossover => write!(f, "single-crossover"),
            Self::Uniform { rate, rates: None } => write!(f, "uniform={rate}"),
            Self::Uniform {
                rates: Some(rates), ..
            } => {
                let rates: Vec<String> = rates.iter().map(f64::to_string).collect();
                write!(f, "uniform={}", rates.join(","))
            }
            Self::RecombinationMap { maps } => write!(f, "recombination-map({} maps)", maps.len()),
            Self::Composite { chromosomes, .. } => {
                write!(f, "composite({} chromosomes)", chromosomes.len())
            }
        }
    }
}

impl FromStr for GeneratorConfig {
    type Err = String;

    /// Parse the short forms `trivial`, `single-crossover`, `uniform`,
    /// `uniform=<rate>` and `uniform=<rate>,<rate>,...`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = match s.split_once('=') {
            Some((kind, value)) => (kind.trim(), Some(value.trim())),
            None => (s.trim(), None),
        };
        match (kind.to_lowercase().replace('_', "-").as_str(), value) {
            ("trivial", None) => Ok(Self::Trivial),
            ("single-crossover", None) => Ok(Self::SingleCrossover),
            ("uniform", None) => Ok(Self::uniform(default_rate())),
            ("uniform", Some(value)) => {
                let rates = value
                    .split(',')
                    .map(|r| r.trim().parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| format!("invalid uniform rate '{value}': {e}"))?;
                match rates.as_slice() {
                    [rate] => Ok(Self::uniform(*rate)),
                    _ => Ok(Self::Uniform {
                        rate: default_rate(),
                        rates: Some(rates),
                    }),
                }
            }
            _ => Err(format!(
                "unknown recombination generator '{s}' (expected trivial, single-crossover or uniform[=rate])"
            )),
        }
    }
}

fn check_lengths(lengths: &[Position]) -> Result<(), RecombinationError> {
    match lengths.iter().position(|&l| l == 0) {
        Some(i) => Err(RecombinationError::ZeroLength(i)),
        None => Ok(()),
    }
}

fn check_rate(rate: f64) -> Result<(), RecombinationError> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(())
    } else {
        Err(RecombinationError::InvalidRate(rate))
    }
}

/// Length and crossover rate of one chromosome under the uniform model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformChromosome {
    pub length: Position,
    pub rate: f64,
}

/// Initialized position generator.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionGenerator {
    Trivial,
    SingleCrossover {
        lengths: Vec<Position>,
    },
    Uniform {
        chromosomes: Vec<UniformChromosome>,
    },
    RecombinationMap {
        maps: Vec<RecombinationMap>,
    },
    Composite {
        default: Box<PositionGenerator>,
        overrides: HashMap<usize, PositionGenerator>,
    },
}

impl PositionGenerator {
    /// Sorted breakpoints for one gamete of chromosome pair `index`.
    pub fn get_positions<R: Rng + ?Sized>(
        &self,
        index: usize,
        rng: &mut R,
    ) -> Result<Vec<Position>, RecombinationError> {
        self.get_positions_with_rate(index, None, rng)
    }

    /// Like [`get_positions`](Self::get_positions), with an optional rate that
    /// replaces the configured one. Only the uniform model uses the rate.
    pub fn get_positions_with_rate<R: Rng + ?Sized>(
        &self,
        index: usize,
        rate_override: Option<f64>,
        rng: &mut R,
    ) -> Result<Vec<Position>, RecombinationError> {
        match self {
            Self::Trivial => Ok(starting_parent(rng, 0)),
            Self::SingleCrossover { lengths } => {
                let length = *lengths.get(index).ok_or(
                    RecombinationError::ChromosomeIndexOutOfRange {
                        index,
                        count: lengths.len(),
                    },
                )?;
                let mut positions = starting_parent(rng, 1);
                if rng.random::<f64>() < 0.5 {
                    positions.push(rng.random_range(0..length));
                }
                Ok(positions)
            }
            Self::Uniform { chromosomes } => {
                let info = chromosomes.get(index).ok_or(
                    RecombinationError::ChromosomeIndexOutOfRange {
                        index,
                        count: chromosomes.len(),
                    },
                )?;
                let rate = match rate_override {
                    Some(rate) => {
                        check_rate(rate)?;
                        rate
                    }
                    None => info.rate,
                };
                let count = poisson_count(rate, rng)?.min(info.length as usize);

                let mut crossovers: Vec<Position> = index::sample(rng, info.length as usize, count)
                    .into_iter()
                    .filter(|&p| p != 0)
                    .map(|p| p as Position)
                    .collect();
                crossovers.sort_unstable();

                let mut positions = starting_parent(rng, crossovers.len());
                positions.extend(crossovers);
                Ok(positions)
            }
            Self::RecombinationMap { maps } => {
                let map = maps
                    .get(index)
                    .ok_or(RecombinationError::ChromosomeIndexOutOfRange {
                        index,
                        count: maps.len(),
                    })?;
                let mut positions = map.random_positions(rng);
                if rng.random::<f64>() < 0.5 {
                    positions.push(0);
                }
                positions.sort_unstable();
                Ok(positions)
            }
            Self::Composite { default, overrides } => overrides
                .get(&index)
                .unwrap_or(&**default)
                .get_positions_with_rate(index, rate_override, rng),
        }
    }

    /// Build one gamete from `pair` by recombining its two chromosomes.
    ///
    /// `rate_override` wins over the pair's own
    /// [`recombination_rate`](ChromosomePair::recombination_rate).
    pub fn gamete<R: Rng + ?Sized>(
        &self,
        pair: &ChromosomePair,
        index: usize,
        rate_override: Option<f64>,
        rng: &mut R,
    ) -> Result<Chromosome, RecombinationError> {
        let positions =
            self.get_positions_with_rate(index, rate_override.or(pair.recombination_rate), rng)?;
        Ok(Chromosome::recombine(
            &pair.maternal,
            &pair.paternal,
            &positions,
        ))
    }
}

/// Empty, or `[0]`, each with probability ½. `extra` reserves room for
/// the crossovers that follow.
fn starting_parent<R: Rng + ?Sized>(rng: &mut R, extra: usize) -> Vec<Position> {
    let mut positions = Vec::with_capacity(extra + 1);
    if rng.random::<f64>() < 0.5 {
        positions.push(0);
    }
    positions
}

fn poisson_count<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> Result<usize, RecombinationError> {
    if rate == 0.0 {
        return Ok(0);
    }
    let poisson = Poisson::new(rate).map_err(|_| RecombinationError::InvalidRate(rate))?;
    Ok(poisson.sample(rng) as usize)
}

/// Recombination rate derived from a parent's fitness value.
///
/// When configured, each parent's gametes use `fitness × scale` as the
/// crossover rate in place of the generator's own rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateOverride {
    pub scale: f64,
}

impl RateOverride {
    #[inline]
    pub fn rate_for(&self, fitness: f64) -> f64 {
        fitness * self.scale
    }
}

/// Serializable recombination setup: one generator for gametes from mothers,
/// one for gametes from fathers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecombinationConfig {
    pub maternal: GeneratorConfig,
    pub paternal: GeneratorConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_override: Option<RateOverride>,
}

impl RecombinationConfig {
    /// Same generator for both parents.
    pub fn symmetric(generator: GeneratorConfig) -> Self {
        Self {
            maternal: generator.clone(),
            paternal: generator,
            rate_override: None,
        }
    }

    pub fn with_rate_override(mut self, scale: f64) -> Self {
        self.rate_override = Some(RateOverride { scale });
        self
    }

    /// Initialize both generators for the given chromosome lengths.
    pub fn initialize(&self, lengths: &[Position]) -> Result<RecombinationModel, RecombinationError> {
        Ok(RecombinationModel {
            maternal: self.maternal.initialize(lengths)?,
            paternal: self.paternal.initialize(lengths)?,
            rate_override: self.rate_override,
        })
    }
}

impl Default for RecombinationConfig {
    fn default() -> Self {
        Self::symmetric(GeneratorConfig::Trivial)
    }
}

/// Initialized generators used while constructing a generation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecombinationModel {
    pub maternal: PositionGenerator,
    pub paternal: PositionGenerator,
    pub rate_override: Option<RateOverride>,
}

impl RecombinationModel {
    pub fn new(maternal: PositionGenerator, paternal: PositionGenerator) -> Self {
        Self {
            maternal,
            paternal,
            rate_override: None,
        }
    }

    /// Same generator for both parents.
    pub fn symmetric(generator: PositionGenerator) -> Self {
        Self::new(generator.clone(), generator)
    }

    /// Trivial generators on both sides: whole chromosomes are inherited.
    pub fn trivial() -> Self {
        Self::symmetric(PositionGenerator::Trivial)
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
    fn test_trivial_outcomes() {
        let generator = GeneratorConfig::Trivial.initialize(&[]).unwrap();
        let mut rng = rng();
        let n = 10_000;
        let mut empty = 0;
        for _ in 0..n {
            let positions = generator.get_positions(3, &mut rng).unwrap();
            match positions.as_slice() {
                [] => empty += 1,
                [0] => {}
                other => panic!("unexpected trivial output {other:?}"),
            }
        }
        let freq = empty as f64 / n as f64;
        // 4 standard deviations of a fair coin over 10k draws
        assert!((freq - 0.5).abs() < 0.02, "empty frequency {freq}");
    }

    #[test]
    fn test_single_crossover() {
        let generator = GeneratorConfig::SingleCrossover.initialize(&[100]).unwrap();
        let mut rng = rng();
        let mut crossovers = 0;
        for _ in 0..2000 {
            let positions = generator.get_positions(0, &mut rng).unwrap();
            assert!(positions.len() <= 2);
            assert!(positions.iter().all(|&p| p < 100));
            assert!(positions.windows(2).all(|w| w[0] <= w[1]));
            match positions.as_slice() {
                [_, _] => crossovers += 1,
                [p] if *p != 0 => crossovers += 1,
                _ => {}
            }
        }
        // about half the gametes cross over
        assert!(crossovers > 850 && crossovers < 1150, "crossovers {crossovers}");
    }

    #[test]
    fn test_single_crossover_index_out_of_range() {
        let generator = GeneratorConfig::SingleCrossover.initialize(&[100]).unwrap();
        assert_eq!(
            generator.get_positions(1, &mut rng()),
            Err(RecombinationError::ChromosomeIndexOutOfRange { index: 1, count: 1 })
        );
    }

    #[test]
    fn test_uniform_positions_sorted_and_in_range() {
        let generator = GeneratorConfig::uniform(5.0).initialize(&[1000, 50]).unwrap();
        let mut rng = rng();
        for _ in 0..500 {
            let p0 = generator.get_positions(0, &mut rng).unwrap();
            assert!(p0.windows(2).all(|w| w[0] < w[1]), "{p0:?}");
            assert!(p0.iter().all(|&p| p < 1000));

            let p1 = generator.get_positions(1, &mut rng).unwrap();
            assert!(p1.iter().all(|&p| p < 50));
        }
    }

    #[test]
    fn test_uniform_mean_crossovers() {
        let generator = GeneratorConfig::uniform(2.0).initialize(&[1_000_000]).unwrap();
        let mut rng = rng();
        let n = 5000;
        let total: usize = (0..n)
            .map(|_| {
                generator
                    .get_positions(0, &mut rng)
                    .unwrap()
                    .iter()
                    .filter(|&&p| p != 0)
                    .count()
            })
            .sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 2.0).abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn test_uniform_zero_rate() {
        let generator = GeneratorConfig::uniform(0.0).initialize(&[100]).unwrap();
        let mut rng = rng();
        for _ in 0..100 {
            let positions = generator.get_positions(0, &mut rng).unwrap();
            assert!(positions.is_empty() || positions == vec![0]);
        }
    }

    #[test]
    fn test_uniform_rate_override() {
        let generator = GeneratorConfig::uniform(0.0).initialize(&[1_000_000]).unwrap();
        let mut rng = rng();
        let total: usize = (0..200)
            .map(|_| {
                generator
                    .get_positions_with_rate(0, Some(10.0), &mut rng)
                    .unwrap()
                    .iter()
                    .filter(|&&p| p != 0)
                    .count()
            })
            .sum();
        assert!(total > 1500, "total {total}");

        assert_eq!(
            generator.get_positions_with_rate(0, Some(-1.0), &mut rng),
            Err(RecombinationError::InvalidRate(-1.0))
        );
    }

    #[test]
    fn test_uniform_initialize_errors() {
        assert_eq!(
            GeneratorConfig::uniform(1.0).initialize(&[100, 0]),
            Err(RecombinationError::ZeroLength(1))
        );
        assert_eq!(
            GeneratorConfig::uniform(-2.0).initialize(&[100]),
            Err(RecombinationError::InvalidRate(-2.0))
        );
        let config = GeneratorConfig::Uniform {
            rate: 1.0,
            rates: Some(vec![1.0, 2.0]),
        };
        assert_eq!(
            config.initialize(&[100]),
            Err(RecombinationError::RateCountMismatch {
                rates: 2,
                chromosomes: 1
            })
        );
    }

    #[test]
    fn test_recombination_map_generator() {
        let records = vec![
            MapRecord::new(0, 0.0, 0.0),
            MapRecord::new(500, 0.0, 0.0),
            MapRecord::new(600, 0.0, 300.0),
        ];
        let config = GeneratorConfig::RecombinationMap {
            maps: vec![records],
        };
        let generator = config.initialize(&[1000]).unwrap();
        let mut rng = rng();
        for _ in 0..500 {
            let positions = generator.get_positions(0, &mut rng).unwrap();
            assert!(positions.windows(2).all(|w| w[0] <= w[1]));
            assert!(positions.iter().all(|&p| p == 0 || (500..600).contains(&p)));
        }
        assert!(generator.get_positions(1, &mut rng).is_err());
    }

    #[test]
    fn test_composite_dispatch() {
        let config = GeneratorConfig::Composite {
            default: None,
            chromosomes: vec![ChromosomeGenerator {
                chromosome: 2,
                generator: GeneratorConfig::uniform(20.0),
            }],
        };
        let generator = config.initialize(&[1000, 1000]).unwrap();
        let mut rng = rng();

        // chromosome 1 falls back to trivial
        for _ in 0..100 {
            assert!(generator.get_positions(0, &mut rng).unwrap().len() <= 1);
        }
        let busy = (0..100)
            .filter(|_| generator.get_positions(1, &mut rng).unwrap().len() > 1)
            .count();
        assert!(busy > 90);
    }

    #[test]
    fn test_composite_config_errors() {
        let zero = GeneratorConfig::Composite {
            default: None,
            chromosomes: vec![ChromosomeGenerator {
                chromosome: 0,
                generator: GeneratorConfig::Trivial,
            }],
        };
        assert_eq!(
            zero.initialize(&[10]),
            Err(RecombinationError::ZeroChromosomeNumber)
        );

        let entry = ChromosomeGenerator {
            chromosome: 1,
            generator: GeneratorConfig::Trivial,
        };
        let duplicate = GeneratorConfig::Composite {
            default: None,
            chromosomes: vec![entry.clone(), entry],
        };
        assert_eq!(
            duplicate.initialize(&[10]),
            Err(RecombinationError::DuplicateChromosome(1))
        );

        let beyond = GeneratorConfig::Composite {
            default: None,
            chromosomes: vec![ChromosomeGenerator {
                chromosome: 3,
                generator: GeneratorConfig::SingleCrossover,
            }],
        };
        assert_eq!(
            beyond.initialize(&[10, 20]),
            Err(RecombinationError::ChromosomeIndexOutOfRange { index: 2, count: 2 })
        );
    }

    #[test]
    fn test_gamete_uses_pair_rate() {
        let generator = GeneratorConfig::uniform(0.0).initialize(&[1_000_000]).unwrap();
        let mut pair = ChromosomePair::founder(1, 2);
        pair.recombination_rate = Some(30.0);
        let gamete = generator.gamete(&pair, 0, None, &mut rng()).unwrap();
        assert!(gamete.segment_count() > 5);
        assert_eq!(gamete.ancestry_ids(), vec![1, 2]);
    }

    #[test]
    fn test_gamete_trivial_copies_one_parent() {
        let pair = ChromosomePair::founder(1, 2);
        let mut rng = rng();
        for _ in 0..50 {
            let gamete = PositionGenerator::Trivial
                .gamete(&pair, 0, None, &mut rng)
                .unwrap();
            assert!(gamete == pair.maternal || gamete == pair.paternal);
        }
    }

    #[test]
    fn test_generator_config_parse() {
        assert_eq!("trivial".parse::<GeneratorConfig>().unwrap(), GeneratorConfig::Trivial);
        assert_eq!(
            "single_crossover".parse::<GeneratorConfig>().unwrap(),
            GeneratorConfig::SingleCrossover
        );
        assert_eq!(
            "uniform=2.5".parse::<GeneratorConfig>().unwrap(),
            GeneratorConfig::uniform(2.5)
        );
        assert_eq!(
            "uniform=1,2".parse::<GeneratorConfig>().unwrap(),
            GeneratorConfig::Uniform {
                rate: 1.0,
                rates: Some(vec![1.0, 2.0])
            }
        );
        assert!("poisson".parse::<GeneratorConfig>().is_err());
        assert!("uniform=x".parse::<GeneratorConfig>().is_err());
    }

    #[test]
    fn test_config_json() {
        let config = RecombinationConfig::symmetric(GeneratorConfig::uniform(1.5));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"kind\":\"uniform\""));
        let back: RecombinationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
