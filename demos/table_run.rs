//! Quick evolution performance test

use creature_evolution::{
    EvolutionConfig, GenerationController, TableTrialRunner,
    schema::{CrossoverPolicy, TrialConfig},
};
use std::time::Instant;

fn main() {
    println!("=== Evolution Performance Test ===\n");

    for policy in [CrossoverPolicy::Always, CrossoverPolicy::Probabilistic] {
        println!("Crossover policy: {:?}", policy);

        let config = EvolutionConfig {
            population_size: 20,
            generations: 10,
            crossover_policy: policy,
            trial: TrialConfig {
                max_seconds: 20.0,
                surface_noise: 0.05,
                ..Default::default()
            },
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let runner = TableTrialRunner::from_config(&config);
        let result = match GenerationController::new(config, runner).and_then(|mut c| c.run()) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("  failed: {}", e);
                continue;
            }
        };
        let elapsed = start.elapsed();

        let first = result.history.first().map_or(0.0, |s| s.mean_fitness);
        let last = result.history.last().map_or(0.0, |s| s.mean_fitness);

        println!("  Generations:    {}", result.generations);
        println!("  Evaluations:    {}", result.total_evaluations);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Mean fitness:   {:.3} -> {:.3}", first, last);
        if let Some(best) = &result.best {
            println!("  Best:           {} {:.3}", best.name, best.fitness);
        }
        println!();
    }

    println!("=== Scalability Test (concurrent trials) ===\n");

    for concurrent in [1, 4, 20] {
        let config = EvolutionConfig {
            population_size: 40,
            generations: 5,
            selection_size: 20,
            max_concurrent_trials: concurrent,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let runner = TableTrialRunner::from_config(&config);
        let mut controller = match GenerationController::new(config, runner) {
            Ok(controller) => controller,
            Err(e) => {
                eprintln!("  failed: {}", e);
                continue;
            }
        };

        let mut ticks = 0u64;
        while !controller.is_finished() {
            if let Err(e) = controller.tick() {
                eprintln!("  failed: {}", e);
                break;
            }
            ticks += 1;
        }

        println!(
            "  In flight {:>2}: {:>8} ticks, {:.2}s",
            concurrent,
            ticks,
            start.elapsed().as_secs_f64()
        );
    }
}
