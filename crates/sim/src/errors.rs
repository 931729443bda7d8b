//! Error types for the simulation kernel.
//!
//! Each concern gets its own enum. Failures are grouped the way callers need
//! to react to them: configuration problems are detected before any population
//! is touched, viability problems mean the mating setup cannot produce
//! offspring, and lookup problems mean an index fell outside an initialized
//! range.

use std::io;

use thiserror::Error;

use crate::genome::Coordinate;

/// Upper bound on the number of segments accepted when decoding a chromosome.
pub const MAX_SEGMENTS: u64 = 10_000;

/// Errors raised when building or parsing an ancestry chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChromosomeError {
    /// A chromosome needs at least one segment.
    #[error("chromosome has no segments")]
    Empty,
    /// The first segment must start at position 0.
    #[error("first segment starts at {0}, expected 0")]
    NonZeroStart(u32),
    /// Segment starts must strictly increase.
    #[error("segment starts are not strictly increasing ({previous} then {next})")]
    Unordered { previous: u32, next: u32 },
    /// Malformed text representation.
    #[error("invalid chromosome text: {0}")]
    Parse(String),
}

/// Errors raised by recombination position generators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecombinationError {
    /// Chromosome index outside the lengths the generator was initialized with.
    #[error("chromosome index {index} out of range ({count} chromosomes initialized)")]
    ChromosomeIndexOutOfRange { index: usize, count: usize },
    /// Rates must be finite and non-negative.
    #[error("invalid recombination rate: {0}")]
    InvalidRate(f64),
    /// Per-chromosome rates do not line up with the chromosome lengths.
    #[error("{rates} recombination rates given for {chromosomes} chromosomes")]
    RateCountMismatch { rates: usize, chromosomes: usize },
    /// Chromosome lengths must be nonzero.
    #[error("chromosome {0} has length 0")]
    ZeroLength(usize),
    /// Recombination map has no records.
    #[error("recombination map has no records")]
    EmptyMap,
    /// Recombination map records are out of order.
    #[error("invalid recombination map: {0}")]
    InvalidMap(String),
    /// Composite chromosome numbers are 1-based.
    #[error("invalid chromosome number 0 in composite generator (chromosomes are numbered from 1)")]
    ZeroChromosomeNumber,
    /// Composite generator names the same chromosome twice.
    #[error("duplicate generator for chromosome {0}")]
    DuplicateChromosome(usize),
}

/// Errors raised by the mating distribution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatingError {
    /// Malformed text representation.
    #[error("invalid mating distribution text: {0}")]
    Parse(String),
    /// Entry weights must be finite and non-negative.
    #[error("invalid mating weight: {0}")]
    InvalidWeight(f64),
    /// A referenced fitness vector does not exist in the population context.
    #[error("population {population} has no trait values named '{trait_id}'")]
    MissingTrait { population: usize, trait_id: String },
    /// An entry refers to a population index outside the parent generation.
    #[error("mating entry refers to population {index}, but only {count} parent populations exist")]
    PopulationIndexOutOfRange { index: usize, count: usize },
    /// Every entry was pruned by fitness validation.
    #[error("no valid mating entries")]
    NoViableEntries,
    /// Rejection sampling ran out of attempts.
    #[error("no valid mating entry drawn after {0} attempts")]
    AttemptsExhausted(usize),
}

/// Errors raised when building fitness-weighted index samplers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    /// Cannot sample from an empty population.
    #[error("cannot sample from population of size 0")]
    EmptyPopulation,
    /// Fitness vector length must equal the population size.
    #[error("fitness vector has {found} values for a population of size {expected}")]
    LengthMismatch { expected: usize, found: usize },
    /// Fitness values must be finite and non-negative.
    #[error("invalid fitness value {value} at index {index}")]
    InvalidFitness { index: usize, value: f64 },
    /// Fitness values sum to zero.
    #[error("fitness values sum to zero")]
    ZeroTotalFitness,
}

/// Errors raised when looking up a cached index sampler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerCacheError {
    #[error("population index {index} out of range ({count} populations)")]
    PopulationIndexOutOfRange { index: usize, count: usize },
    #[error("population {population} has no trait values named '{trait_id}'")]
    MissingTrait { population: usize, trait_id: String },
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Errors raised while constructing or addressing populations.
#[derive(Debug, Error)]
pub enum PopulationError {
    /// Invalid generation configuration, detected before construction starts.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Parent populations and their contexts do not line up.
    #[error("{populations} parent populations but {contexts} population contexts")]
    ContextCountMismatch { populations: usize, contexts: usize },
    /// A parent population's size differs from its context's size.
    #[error("population {population} has {actual} organisms but its context describes {expected}")]
    SizeMismatch {
        population: usize,
        expected: usize,
        actual: usize,
    },
    /// Organism index outside the population.
    #[error("organism index {index} out of range (population size {size})")]
    OrganismIndexOutOfRange { index: usize, size: usize },
    #[error(transparent)]
    Mating(#[from] MatingError),
    #[error(transparent)]
    Sampler(#[from] SamplerCacheError),
    #[error(transparent)]
    Recombination(#[from] RecombinationError),
}

/// Errors raised by genotype resolution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenotypeError {
    /// Coordinate names a chromosome pair the organism does not have.
    #[error("chromosome pair index {index} out of range ({count} pairs)")]
    PairIndexOutOfRange { index: usize, count: usize },
    /// Packed genotypes hold alleles in four bits.
    #[error("allele value {0} does not fit in a packed genotype (max 15)")]
    AlleleOutOfRange(u32),
    /// Genotype map has no data for the coordinate.
    #[error("no genotype data at {0}")]
    MissingCoordinate(Coordinate),
}

/// Errors raised when parsing generation plans and simulation configs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed line in a generation plan.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    /// Well-formed but inconsistent configuration.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Recombination(#[from] RecombinationError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when reading or writing persisted populations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Header or record layout does not match the format.
    #[error("invalid population format: {0}")]
    Format(String),
    /// Segment count above [`MAX_SEGMENTS`], most likely corrupt input.
    #[error("segment count {0} exceeds limit of {MAX_SEGMENTS}")]
    TooManySegments(u64),
    #[error(transparent)]
    Chromosome(#[from] ChromosomeError),
    #[error(transparent)]
    Population(#[from] PopulationError),
}

/// Errors raised by the simulation engine.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Every generation in the plan has already been built.
    #[error("generation plan exhausted after {0} generations")]
    PlanExhausted(usize),
    /// The external trait layer failed.
    #[error("trait evaluation failed for population {population}: {message}")]
    Evaluation { population: usize, message: String },
    /// Missing or inconsistent builder/config input.
    #[error("invalid simulation setup: {0}")]
    Setup(String),
    /// RNG state could not be restored.
    #[error("RNG state error: {0}")]
    RngState(String),
    #[error(transparent)]
    Population(#[from] PopulationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Recombination(#[from] RecombinationError),
}
