use anyhow::{Context, Result};
use lineage_sim::storage::{load_population, PopulationFormat};

use crate::args::InspectArgs;
use crate::printing::print_population_summary;

pub fn inspect_population(args: &InspectArgs) -> Result<()> {
    let format = args
        .format
        .unwrap_or_else(|| PopulationFormat::from_path(&args.input));
    let population = load_population(&args.input, format)
        .with_context(|| format!("Failed to read {} as {format}", args.input.display()))?;

    println!("\n📊 Population {}", args.input.display());
    println!("{}", "=".repeat(50));
    print_population_summary(&population);

    if args.organisms {
        for (index, organism) in population.organisms().enumerate() {
            println!("\norganism {index}");
            print!("{organism}");
        }
    }
    Ok(())
}
