use lineage_sim::evolution::RecombinationConfig;
use lineage_sim::simulation::{Population, SimulationConfig};

fn print_recombination(recombination: &RecombinationConfig) {
    println!("\n🔀 Recombination");
    println!(
        "  • Maternal gametes: {} [-r, --recombination]",
        recombination.maternal
    );
    println!(
        "  • Paternal gametes: {}",
        recombination.paternal
    );
    if let Some(rate_override) = &recombination.rate_override {
        println!("  • Rate from fitness × {}", rate_override.scale);
    }
}

pub fn print_run_parameters(config: &SimulationConfig) {
    println!("📋 Simulation Configuration");
    println!(
        "  • Generations: {} (including founders)",
        config.generations.len()
    );
    if let Some(founders) = config.generations.generations().first() {
        let organisms: usize = founders.iter().map(|c| c.population_size).sum();
        println!(
            "  • Founding populations: {} ({organisms} organisms)",
            founders.len()
        );
    }
    match config.seed {
        Some(seed) => println!("  • Random Seed: {seed} [--seed]"),
        None => println!("  • Random Seed: Random [--seed]"),
    }

    println!("\n🧬 Genome");
    println!(
        "  • Chromosome pairs: {} [-l, --chromosome-lengths]",
        config.chromosome_lengths.len()
    );
    for (i, length) in config.chromosome_lengths.iter().enumerate() {
        println!("    - chromosome {i}: {length} bp");
    }
    if let Some(fitness) = &config.default_fitness {
        println!("  • Default fitness trait: {fitness}");
    }

    print_recombination(&config.recombination);
}

pub fn print_population_summary(population: &Population) {
    println!("  population_size {}", population.population_size());
    println!(
        "  chromosome_pair_count {}",
        population.chromosome_pair_count()
    );
    println!(
        "  mean segments per chromosome: {:.3}",
        population.mean_segment_count()
    );
    for (i, mean) in population.mean_segment_counts_by_pair().iter().enumerate() {
        println!("    - pair {i}: {mean:.3}");
    }
}
