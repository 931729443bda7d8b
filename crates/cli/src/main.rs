mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};

use args::{ConvertArgs, InspectArgs, RunArgs};
use commands::{convert, inspect, run};

/// Lineage: forward-time simulation of ancestry mosaics
///
/// Breeds diploid populations generation by generation and tracks, for every
/// chromosome, which founder each stretch of sequence descends from.
#[derive(Parser, Debug)]
#[command(name = "lineage")]
#[command(author, version, about = "Simulates founder ancestry through recombination", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a simulation and write the final populations.
    ///
    /// Uses a JSON config, a generation plan, or a single randomly mating
    /// population built from the command-line options.
    Run(Box<RunArgs>),

    /// Convert a population file between text and binary form.
    Convert(ConvertArgs),

    /// Show the header and segment statistics of a population file.
    Inspect(InspectArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Run(args) => run::run_simulation(&args)?,
        Commands::Convert(args) => convert::convert_population(&args)?,
        Commands::Inspect(args) => inspect::inspect_population(&args)?,
    }

    Ok(())
}
