//! Generation state machine.
//!
//! ```text
//! Populating -> Evaluating -> Breeding -> Advancing -+-> Populating
//!                   ^  |                            |
//!                   +--+ (one tick per poll)        +-> Finished
//! ```
//!
//! Each call to [`GenerationController::tick`] performs one step. While
//! evaluating, a tick advances every running trial by `tick_seconds` and
//! returns control to the caller; the controller never blocks on a trial.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info};

use crate::recording::Recorder;
use crate::schema::{
    EvolutionConfig, EvolutionPhase, EvolutionResult, GenerationSummary, Genotype,
    ScoredGenotype, StopReason,
};

use super::breeder::{Breeder, BreedingParams};
use super::error::EvolutionError;
use super::evaluator::{Evaluator, Presenter, TrialRunner};
use super::genome::{GenomeRng, GenotypeSpace};
use super::ledger::FitnessLedger;
use super::population::Population;

/// State owned by the current generation; replaced wholesale when the next
/// generation is populated.
#[derive(Debug, Default)]
struct GenerationState {
    generation: usize,
    population: Population,
    ledger: FitnessLedger,
}

/// Orchestrates populate, evaluate, breed and advance.
pub struct GenerationController<R: TrialRunner> {
    config: EvolutionConfig,
    rng: GenomeRng,
    breeder: Breeder,
    evaluator: Evaluator<R>,
    recorders: Vec<Box<dyn Recorder>>,
    phase: EvolutionPhase,
    state: GenerationState,
    next_genotypes: Vec<Genotype>,
    history: Vec<GenerationSummary>,
    best: Option<ScoredGenotype>,
    total_evaluations: u64,
    stop_reason: Option<StopReason>,
    cancelled: Arc<AtomicBool>,
}

impl<R: TrialRunner> GenerationController<R> {
    /// Create a controller with a random initial population.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: EvolutionConfig, runner: R) -> Result<Self, EvolutionError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let mut rng = GenomeRng::new(seed);
        let space = GenotypeSpace::from_config(&config);
        let next_genotypes = rng.initial_population(config.population_size, &space);

        let evaluator = Evaluator::new(runner).with_max_in_flight(config.max_concurrent_trials);
        let breeder = Breeder::new(BreedingParams::from_config(&config), space);

        Ok(Self {
            config,
            rng,
            breeder,
            evaluator,
            recorders: Vec::new(),
            phase: EvolutionPhase::Populating,
            state: GenerationState::default(),
            next_genotypes,
            history: Vec::new(),
            best: None,
            total_evaluations: 0,
            stop_reason: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Set the presenter used while trials run.
    pub fn with_presenter(mut self, presenter: Box<dyn Presenter>) -> Self {
        self.evaluator = self.evaluator.with_presenter(presenter);
        self
    }

    /// Add a recorder.
    pub fn with_recorder(mut self, recorder: Box<dyn Recorder>) -> Self {
        self.recorders.push(recorder);
        self
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    /// Current generation number, starting at 0.
    pub fn generation(&self) -> usize {
        self.state.generation
    }

    pub fn population(&self) -> &Population {
        &self.state.population
    }

    pub fn ledger(&self) -> &FitnessLedger {
        &self.state.ledger
    }

    /// Genotypes queued for the next population.
    pub fn next_genotypes(&self) -> &[Genotype] {
        &self.next_genotypes
    }

    pub fn history(&self) -> &[GenerationSummary] {
        &self.history
    }

    pub fn is_finished(&self) -> bool {
        self.phase == EvolutionPhase::Finished
    }

    /// Perform one state-machine step and return the resulting phase.
    pub fn tick(&mut self) -> Result<EvolutionPhase, EvolutionError> {
        if self.phase != EvolutionPhase::Finished && self.cancelled.load(Ordering::Relaxed) {
            let dropped = self.evaluator.cancel();
            info!(
                "cancelled in generation {} ({} trials discarded)",
                self.state.generation, dropped
            );
            self.finish(StopReason::Cancelled);
            return Ok(self.phase);
        }

        match self.phase {
            EvolutionPhase::Populating => self.populate(),
            EvolutionPhase::Evaluating => self.evaluate()?,
            EvolutionPhase::Breeding => self.breed()?,
            EvolutionPhase::Advancing => self.advance(),
            EvolutionPhase::Finished => {}
        }

        Ok(self.phase)
    }

    fn populate(&mut self) {
        let genotypes = std::mem::take(&mut self.next_genotypes);
        debug!(
            "populating generation {} with {} genotypes",
            self.state.generation,
            genotypes.len()
        );
        self.state.population = Population::new(self.state.generation, genotypes);
        self.state.ledger = FitnessLedger::with_capacity(self.config.population_size);
        self.phase = EvolutionPhase::Evaluating;
    }

    fn evaluate(&mut self) -> Result<(), EvolutionError> {
        let outcomes = self.evaluator.tick(
            &mut self.state.population,
            &mut self.state.ledger,
            &mut self.rng,
            self.config.tick_seconds,
        )?;

        for outcome in &outcomes {
            self.total_evaluations += 1;
            for recorder in &mut self.recorders {
                recorder.trial_scored(self.state.generation, outcome)?;
            }
        }

        if self.evaluator.is_complete(&self.state.population) {
            self.phase = EvolutionPhase::Breeding;
        }
        Ok(())
    }

    fn breed(&mut self) -> Result<(), EvolutionError> {
        let generation = self.state.generation;
        let ledger = &self.state.ledger;
        let stats = ledger.stats().ok_or(EvolutionError::IncompleteLedger {
            expected: self.config.population_size,
            found: 0,
        })?;

        // offspring of the final generation would never be evaluated
        if generation + 1 < self.config.generations {
            self.next_genotypes = self.breeder.breed(ledger, &mut self.rng)?;
        }

        if let Some(entry) = ledger.best()
            && self.best.as_ref().is_none_or(|b| entry.fitness > b.fitness)
        {
            self.best = Some(ScoredGenotype {
                name: entry.individual.name.clone(),
                generation,
                fitness: entry.fitness,
                genotype: entry.individual.genotype.clone(),
            });
        }

        let summary = GenerationSummary {
            generation,
            mean_fitness: stats.mean,
            best_fitness: stats.max,
            worst_fitness: stats.min,
            fitness_std: stats.std,
            evaluations: stats.count,
        };
        info!("Generation {} : {}", generation, summary.mean_fitness);
        for recorder in &mut self.recorders {
            recorder.generation_completed(&summary)?;
        }
        self.history.push(summary);

        self.phase = EvolutionPhase::Advancing;
        Ok(())
    }

    fn advance(&mut self) {
        self.state.generation += 1;
        if self.state.generation >= self.config.generations {
            self.finish(StopReason::MaxGenerations);
        } else {
            self.phase = EvolutionPhase::Populating;
        }
    }

    fn finish(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
        self.phase = EvolutionPhase::Finished;
    }

    /// Tick until finished.
    pub fn run(&mut self) -> Result<EvolutionResult, EvolutionError> {
        let start_time = Instant::now();
        while !self.is_finished() {
            self.tick()?;
        }
        Ok(self.result(start_time.elapsed().as_secs_f64()))
    }

    /// Snapshot of the run so far.
    pub fn result(&self, elapsed_seconds: f64) -> EvolutionResult {
        EvolutionResult {
            generations: self.history.len(),
            total_evaluations: self.total_evaluations,
            best: self.best.clone(),
            history: self.history.clone(),
            elapsed_seconds,
            stop_reason: self
                .stop_reason
                .clone()
                .unwrap_or(StopReason::MaxGenerations),
        }
    }
}
