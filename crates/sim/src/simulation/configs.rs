//! Generation plans and simulation configuration.
//!
//! A generation plan lists, for every generation, the configuration of each
//! population to build. The plan has a line-oriented text form:
//!
//! ```text
//! generation 0
//! population population_size=100 chromosome_pair_count=2
//! population population_size=50 chromosome_pair_count=2
//!
//! generation 1
//! population population_size=150 mating_distribution={<0.7|0,,0,><0.3|1,,0,>}
//! ```
//!
//! A [`SimulationConfig`] bundles a plan with chromosome lengths, the
//! recombination setup and a seed. It is loaded from JSON.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::base::{AncestryId, Position};
pub use crate::errors::ConfigError;
use crate::evolution::{MatingDistribution, RecombinationConfig};

/// Configuration of one population in one generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub population_size: usize,
    /// First ancestry id handed out in a founding generation.
    pub id_offset: AncestryId,
    /// Chromosome pairs per organism. 0 means inherit the count from the parents.
    pub chromosome_pair_count: usize,
    pub mating_distribution: MatingDistribution,
}

impl GenerationConfig {
    /// Founding population of `population_size` organisms.
    pub fn founder(population_size: usize, chromosome_pair_count: usize) -> Self {
        Self {
            population_size,
            chromosome_pair_count,
            ..Default::default()
        }
    }

    /// Population bred from the previous generation.
    pub fn offspring(population_size: usize, mating_distribution: MatingDistribution) -> Self {
        Self {
            population_size,
            mating_distribution,
            ..Default::default()
        }
    }

    pub fn with_id_offset(mut self, id_offset: AncestryId) -> Self {
        self.id_offset = id_offset;
        self
    }

    /// Whether this config founds a population from nothing.
    #[inline]
    pub fn is_founder(&self) -> bool {
        self.mating_distribution.is_empty()
    }

    fn parse_line(line: &str) -> Result<Self, String> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("population") {
            return Err(format!("expected 'population ...', found '{}'", line.trim()));
        }

        let mut config = Self::default();
        for token in tokens {
            let Some((name, value)) = token.split_once('=').filter(|(n, v)| !n.is_empty() && !v.is_empty())
            else {
                log::warn!("ignoring invalid token '{token}'");
                continue;
            };
            let number = |value: &str| {
                value
                    .parse::<usize>()
                    .map_err(|e| format!("invalid {name} '{value}': {e}"))
            };
            match name {
                "population_size" => config.population_size = number(value)?,
                "id_offset" => {
                    config.id_offset = value
                        .parse()
                        .map_err(|e| format!("invalid id_offset '{value}': {e}"))?
                }
                "chromosome_pair_count" => config.chromosome_pair_count = number(value)?,
                "mating_distribution" => {
                    config.mating_distribution = value.parse().map_err(|e| format!("{e}"))?
                }
                _ => log::warn!("ignoring unknown setting '{name}'"),
            }
        }
        Ok(config)
    }
}

impl fmt::Display for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "population population_size={}", self.population_size)?;
        if self.id_offset != 0 {
            write!(f, " id_offset={}", self.id_offset)?;
        }
        if self.chromosome_pair_count != 0 {
            write!(f, " chromosome_pair_count={}", self.chromosome_pair_count)?;
        }
        if !self.mating_distribution.is_empty() {
            write!(f, " mating_distribution={}", self.mating_distribution)?;
        }
        Ok(())
    }
}

impl FromStr for GenerationConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_line(s).map_err(|message| ConfigError::Parse { line: 1, message })
    }
}

/// Population configs for every generation, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlanRepr", into = "PlanRepr")]
pub struct GenerationPlan(Vec<Vec<GenerationConfig>>);

/// A plan in JSON is either its text form or a list of generations.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PlanRepr {
    Text(String),
    Structured(Vec<Vec<GenerationConfig>>),
}

impl TryFrom<PlanRepr> for GenerationPlan {
    type Error = ConfigError;

    fn try_from(repr: PlanRepr) -> Result<Self, Self::Error> {
        match repr {
            PlanRepr::Text(text) => text.parse(),
            PlanRepr::Structured(generations) => Ok(Self(generations)),
        }
    }
}

impl From<GenerationPlan> for PlanRepr {
    fn from(plan: GenerationPlan) -> Self {
        PlanRepr::Text(plan.to_string())
    }
}

impl GenerationPlan {
    pub fn new(generations: Vec<Vec<GenerationConfig>>) -> Self {
        Self(generations)
    }

    /// Read the text form from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        fs::read_to_string(path)?.parse()
    }

    #[inline]
    pub fn generations(&self) -> &[Vec<GenerationConfig>] {
        &self.0
    }

    #[inline]
    pub fn generations_mut(&mut self) -> &mut [Vec<GenerationConfig>] {
        &mut self.0
    }

    /// Configs of generation `index`.
    #[inline]
    pub fn generation(&self, index: usize) -> Option<&[GenerationConfig]> {
        self.0.get(index).map(Vec::as_slice)
    }

    /// Number of generations.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, configs: Vec<GenerationConfig>) {
        self.0.push(configs);
    }

    /// One randomly mating population: a founding generation followed by
    /// `offspring_generations` generations of the same size.
    pub fn random_mating(
        population_size: usize,
        chromosome_pair_count: usize,
        offspring_generations: usize,
    ) -> Self {
        let mating = MatingDistribution::random_mating(0);
        let mut generations = Vec::with_capacity(offspring_generations + 1);
        generations.push(vec![GenerationConfig::founder(
            population_size,
            chromosome_pair_count,
        )]);
        for _ in 0..offspring_generations {
            generations.push(vec![GenerationConfig::offspring(
                population_size,
                mating.clone(),
            )]);
        }
        Self(generations)
    }

    /// Check the plan is usable with `chromosome_count` chromosomes.
    ///
    /// The first generation must exist and found every population with the
    /// configured chromosome count; later generations need a mating
    /// distribution for every nonempty population and may only reference
    /// populations of the generation before them.
    pub fn validate(&self, chromosome_count: usize) -> Result<(), ConfigError> {
        let first = self
            .0
            .first()
            .ok_or_else(|| ConfigError::Invalid("generation plan is empty".to_string()))?;

        for (i, config) in first.iter().enumerate() {
            if config.chromosome_pair_count != chromosome_count {
                return Err(ConfigError::Invalid(format!(
                    "founding population {i} has chromosome_pair_count={}, expected {chromosome_count}",
                    config.chromosome_pair_count
                )));
            }
            if !config.is_founder() {
                log::warn!("founding population {i} ignores its mating distribution");
            }
        }

        for (generation, pair) in self.0.windows(2).enumerate() {
            let parents = pair[0].len();
            for (i, config) in pair[1].iter().enumerate() {
                if config.is_founder() && config.population_size > 0 {
                    return Err(ConfigError::Invalid(format!(
                        "generation {}: population {i} has no mating distribution",
                        generation + 1
                    )));
                }
                config
                    .mating_distribution
                    .check_population_indices(parents)
                    .map_err(|e| {
                        ConfigError::Invalid(format!("generation {}: {e}", generation + 1))
                    })?;
                if config.chromosome_pair_count != 0 && config.chromosome_pair_count != chromosome_count {
                    return Err(ConfigError::Invalid(format!(
                        "generation {}: chromosome_pair_count={}, expected {chromosome_count}",
                        generation + 1,
                        config.chromosome_pair_count
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for GenerationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, configs) in self.0.iter().enumerate() {
            writeln!(f, "generation {i}")?;
            for config in configs {
                writeln!(f, "{config}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for GenerationPlan {
    type Err = ConfigError;

    /// Parse the text form.
    ///
    /// Founding configs without an explicit `id_offset` get consecutive id
    /// ranges within their generation. Blank lines and `#` comments are
    /// skipped; other unrecognized lines are skipped with a warning.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut generations: Vec<Vec<GenerationConfig>> = Vec::new();
        let mut next_id_offset: AncestryId = 0;

        for (number, line) in s.lines().enumerate() {
            let line_number = number + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match trimmed.split_whitespace().next() {
                Some("generation") => {
                    generations.push(Vec::new());
                    next_id_offset = 0;
                }
                Some("population") => {
                    let current = generations.last_mut().ok_or_else(|| ConfigError::Parse {
                        line: line_number,
                        message: "population line before any generation line".to_string(),
                    })?;
                    let mut config =
                        GenerationConfig::parse_line(trimmed).map_err(|message| {
                            ConfigError::Parse {
                                line: line_number,
                                message,
                            }
                        })?;

                    if config.chromosome_pair_count > 0 {
                        if config.id_offset == 0 {
                            config.id_offset = next_id_offset;
                        }
                        let span = config
                            .population_size
                            .checked_mul(2)
                            .and_then(|ids| AncestryId::try_from(ids).ok())
                            .ok_or_else(|| ConfigError::Parse {
                                line: line_number,
                                message: "population too large for ancestry ids".to_string(),
                            })?;
                        next_id_offset = next_id_offset.saturating_add(span);
                    }
                    current.push(config);
                }
                _ => log::warn!("ignoring invalid configuration line {line_number}: {trimmed}"),
            }
        }

        Ok(Self(generations))
    }
}

/// Chromosome length used when a configuration names none.
pub const DEFAULT_CHROMOSOME_LENGTH: Position = 100_000_000;

fn default_chromosome_lengths() -> Vec<Position> {
    vec![DEFAULT_CHROMOSOME_LENGTH]
}

/// Complete, serializable simulation setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// RNG seed. A random seed is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Length of each chromosome, one per chromosome pair.
    #[serde(default = "default_chromosome_lengths")]
    pub chromosome_lengths: Vec<Position>,
    pub generations: GenerationPlan,
    #[serde(default)]
    pub recombination: RecombinationConfig,
    /// Fitness id used by mating entries that leave theirs unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fitness: Option<String>,
}

impl SimulationConfig {
    pub fn new(chromosome_lengths: Vec<Position>, generations: GenerationPlan) -> Self {
        Self {
            seed: None,
            chromosome_lengths,
            generations,
            recombination: RecombinationConfig::default(),
            default_fitness: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the chromosome lengths, the plan and the generators together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chromosome_lengths.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one chromosome length is required".to_string(),
            ));
        }
        self.generations.validate(self.chromosome_lengths.len())?;
        self.recombination.initialize(&self.chromosome_lengths)?;
        Ok(())
    }
}
