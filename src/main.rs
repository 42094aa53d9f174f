//! Creature Evolution CLI - Run an evolution from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use creature_evolution::{
    compute::{
        TableTrialRunner,
        evolution::{GenerationController, LogPresenter},
    },
    recording::{CsvRecorder, LogRecorder},
    schema::{EvolutionConfig, StopReason},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [generations]", args[0]);
        eprintln!();
        eprintln!("Evolve table-balancing creatures from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to evolution configuration file");
        eprintln!("  generations  Override the configured generation count");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let mut config: EvolutionConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Some(generations) = args.get(2).and_then(|s| s.parse().ok()) {
        config.generations = generations;
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    }

    println!("Creature Evolution");
    println!("==================");
    println!(
        "Population: {} ({} elites, {} selected)",
        config.population_size, config.elitism, config.selection_size
    );
    println!("Generations: {}", config.generations);
    println!(
        "Mutation rate: {}, crossover: {:?}",
        config.mutation_rate, config.crossover_policy
    );
    println!("Table radius: {}", config.table_radius);
    println!();

    let runner = TableTrialRunner::from_config(&config);
    let persist = config.persist_to_file.then(|| config.output_path.clone());

    let mut controller = GenerationController::new(config, runner)
        .unwrap_or_else(|e| {
            eprintln!("Error creating controller: {}", e);
            std::process::exit(1);
        })
        .with_presenter(Box::new(LogPresenter::default()))
        .with_recorder(Box::new(LogRecorder));

    if let Some(path) = persist {
        let recorder = CsvRecorder::create(&path).unwrap_or_else(|e| {
            eprintln!("Error creating {}: {}", path.display(), e);
            std::process::exit(1);
        });
        println!("Writing results to {}", path.display());
        controller = controller.with_recorder(Box::new(recorder));
    }

    println!("Running evolution...");
    let start = Instant::now();

    let result = controller.run().unwrap_or_else(|e| {
        eprintln!("Evolution failed: {}", e);
        std::process::exit(1);
    });

    let elapsed = start.elapsed();

    println!();
    println!("Mean fitness per generation:");
    for summary in &result.history {
        println!(
            "  Generation {}: mean={:.3}, best={:.3}, std={:.3}",
            summary.generation, summary.mean_fitness, summary.best_fitness, summary.fitness_std
        );
    }
    println!();

    if let Some(best) = &result.best {
        println!(
            "Best: {} (generation {}) fitness={:.3}",
            best.name, best.generation, best.fitness
        );
        println!("  {}", best.genotype);
    }

    if result.stop_reason == StopReason::Cancelled {
        println!("Stopped early: cancelled");
    }
    println!(
        "Time: {:.2}s ({} trials)",
        elapsed.as_secs_f32(),
        result.total_evaluations
    );
}

fn print_example_config() {
    let config = EvolutionConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
