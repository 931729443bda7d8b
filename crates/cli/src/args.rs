use clap::Args;
use lineage_sim::base::Position;
use lineage_sim::evolution::GeneratorConfig;
use lineage_sim::storage::PopulationFormat;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON simulation config
    ///
    /// Holds the seed, chromosome lengths, generation plan and recombination
    /// setup. Command-line options override the matching fields.
    #[arg(short, long, conflicts_with = "plan")]
    pub config: Option<PathBuf>,

    /// Generation plan in text form (`generation`/`population` lines)
    #[arg(short, long)]
    pub plan: Option<PathBuf>,

    /// Population size for a plain random-mating run (no config or plan)
    #[arg(short = 'n', long, default_value_t = defaults::POPULATION_SIZE)]
    pub population_size: usize,

    /// Offspring generations for a plain random-mating run (no config or plan)
    #[arg(short = 'g', long, default_value_t = defaults::GENERATIONS)]
    pub generations: usize,

    /// Chromosome lengths in bp, comma separated
    #[arg(short = 'l', long, value_delimiter = ',')]
    pub chromosome_lengths: Option<Vec<Position>>,

    /// Recombination generator for both parents
    ///
    /// One of: trivial, single-crossover, uniform, uniform=RATE,
    /// uniform=RATE1,RATE2,...
    #[arg(short, long)]
    pub recombination: Option<GeneratorConfig>,

    /// Random seed (default: configured seed, or random)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file for the final populations
    ///
    /// With several final populations, an index is added before the extension.
    #[arg(short, long, default_value = defaults::OUTPUT)]
    pub output: PathBuf,

    /// Output format (text, binary); guessed from the extension by default
    #[arg(short, long)]
    pub format: Option<PopulationFormat>,

    /// Write the resolved JSON config to this path
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Population file to read
    pub input: PathBuf,

    /// Population file to write
    pub output: PathBuf,

    /// Input format (default: from the input extension)
    #[arg(long)]
    pub from: Option<PopulationFormat>,

    /// Output format (default: from the output extension)
    #[arg(long)]
    pub to: Option<PopulationFormat>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Population file
    pub input: PathBuf,

    /// Input format (default: from the extension)
    #[arg(short, long)]
    pub format: Option<PopulationFormat>,

    /// Also list the organisms
    #[arg(long)]
    pub organisms: bool,
}
