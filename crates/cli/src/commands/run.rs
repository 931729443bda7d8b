use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use lineage_sim::evolution::RecombinationConfig;
use lineage_sim::simulation::{GenerationPlan, Simulation, SimulationBuilder, SimulationConfig};
use lineage_sim::storage::{save_population, PopulationFormat};
use std::path::{Path, PathBuf};

use crate::args::RunArgs;
use crate::defaults;
use crate::printing::{print_population_summary, print_run_parameters};

/// Resolve the simulation config from a JSON file, a plan file, or the
/// random-mating options, then apply command-line overrides.
pub fn resolve_config(args: &RunArgs) -> Result<SimulationConfig> {
    let mut config = if let Some(path) = &args.config {
        SimulationConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?
    } else {
        let lengths = args
            .chromosome_lengths
            .clone()
            .unwrap_or_else(|| defaults::CHROMOSOME_LENGTHS.to_vec());
        let plan = match &args.plan {
            Some(path) => GenerationPlan::from_file(path)
                .with_context(|| format!("Failed to read generation plan {}", path.display()))?,
            None => GenerationPlan::random_mating(args.population_size, lengths.len(), args.generations),
        };
        let generator = defaults::RECOMBINATION
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        let builder = SimulationBuilder::new()
            .chromosome_lengths(lengths)
            .generation_plan(plan)
            .recombination(generator);
        builder.config().context("Invalid simulation setup")?
    };

    if let Some(lengths) = &args.chromosome_lengths {
        config.chromosome_lengths = lengths.clone();
    }
    if let Some(generator) = &args.recombination {
        let rate_override = config.recombination.rate_override;
        config.recombination = RecombinationConfig {
            rate_override,
            ..RecombinationConfig::symmetric(generator.clone())
        };
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.validate().context("Invalid simulation setup")?;
    log::debug!("resolved config: {config:?}");
    Ok(config)
}

/// Path for final population `index` of `count`.
fn output_path(output: &Path, index: usize, count: usize) -> PathBuf {
    if count <= 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "population".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{stem}.{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{index}"),
    };
    output.with_file_name(name)
}

pub fn run_simulation(args: &RunArgs) -> Result<()> {
    println!("🧬 Lineage - Running Simulation");
    println!("============================================\n");

    let config = resolve_config(args)?;
    print_run_parameters(&config);

    if let Some(path) = &args.save_config {
        let json = config.to_json().context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        println!("\n✓ Config saved to {}", path.display());
    }

    let total_generations = config.generations.len();
    let mut sim = Simulation::from_config(config).context("Failed to set up simulation")?;

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total_generations as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}",
                )
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    };

    println!("\nRunning {total_generations} generations...");
    while !sim.is_finished() {
        let generation = sim.generation();
        sim.step()
            .with_context(|| format!("Generation {generation} failed"))?;
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    let format = args
        .format
        .unwrap_or_else(|| PopulationFormat::from_path(&args.output));
    let count = sim.populations().len();
    for (index, population) in sim.populations().iter().enumerate() {
        let path = output_path(&args.output, index, count);
        save_population(population, &path, format)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\n✓ Population {index} written to {} ({format})", path.display());
        print_population_summary(population);
    }

    println!("\n✓ Simulation complete!");
    println!("  Final generation: {}", sim.generation() - 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use lineage_sim::evolution::GeneratorConfig;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    fn args(extra: &[&str]) -> RunArgs {
        TestCli::parse_from(std::iter::once("lineage").chain(extra.iter().copied())).run
    }

    #[test]
    fn test_output_path() {
        let out = Path::new("dir/pop.txt");
        assert_eq!(output_path(out, 0, 1), PathBuf::from("dir/pop.txt"));
        assert_eq!(output_path(out, 1, 3), PathBuf::from("dir/pop.1.txt"));
        assert_eq!(output_path(Path::new("pop"), 2, 3), PathBuf::from("pop.2"));
    }

    #[test]
    fn test_random_mating_config() {
        let config = resolve_config(&args(&["-n", "8", "-g", "3", "-l", "1000,2000", "--seed", "5"]))
            .unwrap();
        assert_eq!(config.chromosome_lengths, vec![1000, 2000]);
        assert_eq!(config.generations.len(), 4);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.recombination.maternal, GeneratorConfig::uniform(1.0));
    }

    #[test]
    fn test_recombination_override() {
        let config = resolve_config(&args(&["-n", "4", "-g", "1", "-r", "single-crossover"])).unwrap();
        assert_eq!(config.recombination.paternal, GeneratorConfig::SingleCrossover);
    }

    #[test]
    fn test_plan_lengths_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let plan = dir.path().join("plan.txt");
        std::fs::write(&plan, "generation 0\npopulation population_size=5 chromosome_pair_count=2\n")
            .unwrap();
        let plan_arg = plan.to_string_lossy().into_owned();
        assert!(resolve_config(&args(&["-p", &plan_arg, "-l", "100"])).is_err());
        assert!(resolve_config(&args(&["-p", &plan_arg, "-l", "100,200"])).is_ok());
    }
}
