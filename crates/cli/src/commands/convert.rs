use anyhow::{Context, Result};
use lineage_sim::storage::{load_population, save_population, PopulationFormat};

use crate::args::ConvertArgs;

pub fn convert_population(args: &ConvertArgs) -> Result<()> {
    let from = args
        .from
        .unwrap_or_else(|| PopulationFormat::from_path(&args.input));
    let to = args
        .to
        .unwrap_or_else(|| PopulationFormat::from_path(&args.output));

    let population = load_population(&args.input, from)
        .with_context(|| format!("Failed to read {} as {from}", args.input.display()))?;
    save_population(&population, &args.output, to)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "✓ Converted {} organisms: {} ({from}) -> {} ({to})",
        population.population_size(),
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
