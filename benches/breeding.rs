//! Benchmarks for breeding and the table trial.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use creature_evolution::{
    compute::{
        TableTrialRunner,
        evolution::{
            Breeder, FitnessLedger, GenomeRng, GenotypeSpace, Individual, Trial, TrialRunner,
            TrialStatus,
        },
    },
    schema::{EvolutionConfig, TrialConfig},
};

fn scored_ledger(size: usize, rng: &mut GenomeRng) -> FitnessLedger {
    let space = GenotypeSpace::default();
    let mut ledger = FitnessLedger::with_capacity(size);
    for (id, genotype) in rng.initial_population(size, &space).into_iter().enumerate() {
        let fitness = rng.unit() * 60.0;
        let individual = Individual::new(id as u64, 0, genotype, rng.rng());
        ledger.insert(fitness, individual);
    }
    ledger
}

fn bench_breed(c: &mut Criterion) {
    let mut group = c.benchmark_group("breed");

    for size in [20, 100, 500] {
        let config = EvolutionConfig {
            population_size: size,
            elitism: size / 10,
            selection_size: size / 2,
            ..Default::default()
        };

        let mut rng = GenomeRng::new(42);
        let ledger = scored_ledger(size, &mut rng);
        let breeder = Breeder::from_config(&config);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| breeder.breed(black_box(&ledger), &mut rng));
        });
    }

    group.finish();
}

fn bench_table_trial(c: &mut Criterion) {
    let mut rng = GenomeRng::new(7);
    let space = GenotypeSpace::default();
    let individual = Individual::new(0, 0, rng.random_genotype(&space), rng.rng());

    let config = TrialConfig {
        surface_noise: 0.1,
        ..Default::default()
    };
    let mut runner = TableTrialRunner::new(config, 0.38, 7);

    c.bench_function("table_trial", |b| {
        b.iter(|| {
            let mut trial = runner.start(black_box(&individual));
            loop {
                if let TrialStatus::Finished(fitness) = trial.poll(1.0 / 60.0) {
                    break fitness;
                }
            }
        });
    });
}

criterion_group!(benches, bench_breed, bench_table_trial);
criterion_main!(benches);
