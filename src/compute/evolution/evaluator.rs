//! Trial evaluation.
//!
//! The [`Evaluator`] feeds individuals from the current [`Population`] into a
//! [`TrialRunner`] and polls their trials once per tick. A trial is a
//! long-running process: nothing is known about how many ticks it needs, so
//! the evaluator only records a fitness once the trial reports a terminal
//! result. With `max_in_flight == 1` the next individual is not spawned
//! until the current one has finished.

use log::{debug, warn};

use super::error::EvolutionError;
use super::genome::GenomeRng;
use super::ledger::FitnessLedger;
use super::population::{Individual, Population};

/// Poll result of a running trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialStatus {
    /// Still running; poll again next tick.
    Running,
    /// Terminal; carries the fitness (higher is fitter).
    Finished(f32),
}

/// One in-progress trial.
pub trait Trial {
    /// Advance the trial by `dt` seconds and report its status.
    fn poll(&mut self, dt: f32) -> TrialStatus;
}

/// Starts trials for individuals.
pub trait TrialRunner {
    type Trial: Trial;

    fn start(&mut self, individual: &Individual) -> Self::Trial;
}

/// Opaque handle to a presented creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresenterHandle(pub u64);

/// Visualizes individuals while they are under test.
pub trait Presenter {
    fn instantiate(&mut self, individual: &Individual) -> PresenterHandle;
    fn destroy(&mut self, handle: PresenterHandle);
}

/// Presenter that shows nothing.
#[derive(Debug, Default)]
pub struct NullPresenter {
    next: u64,
}

impl Presenter for NullPresenter {
    fn instantiate(&mut self, _individual: &Individual) -> PresenterHandle {
        self.next += 1;
        PresenterHandle(self.next)
    }

    fn destroy(&mut self, _handle: PresenterHandle) {}
}

/// Presenter that logs each creature as it enters and leaves the table.
#[derive(Debug, Default)]
pub struct LogPresenter {
    next: u64,
    live: usize,
}

impl LogPresenter {
    /// Number of creatures currently instantiated.
    pub fn live(&self) -> usize {
        self.live
    }
}

impl Presenter for LogPresenter {
    fn instantiate(&mut self, individual: &Individual) -> PresenterHandle {
        self.next += 1;
        self.live += 1;
        debug!("{}: {}", individual.name, individual.genotype);
        PresenterHandle(self.next)
    }

    fn destroy(&mut self, handle: PresenterHandle) {
        self.live = self.live.saturating_sub(1);
        debug!("destroyed creature #{}", handle.0);
    }
}

/// A trial that reached a terminal result during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub id: u64,
    pub name: String,
    pub fitness: f32,
    /// Ascending ledger rank at insertion time.
    pub rank: usize,
}

struct InFlight<T> {
    individual: Individual,
    trial: T,
    handle: PresenterHandle,
    elapsed: f32,
}

/// Drives individuals through a trial runner, a bounded number at a time.
pub struct Evaluator<R: TrialRunner> {
    runner: R,
    presenter: Box<dyn Presenter>,
    in_flight: Vec<InFlight<R::Trial>>,
    max_in_flight: usize,
    next_id: u64,
}

impl<R: TrialRunner> Evaluator<R> {
    /// Create an evaluator running one trial at a time.
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            presenter: Box::new(NullPresenter::default()),
            in_flight: Vec::new(),
            max_in_flight: 1,
            next_id: 0,
        }
    }

    /// Set the presenter.
    pub fn with_presenter(mut self, presenter: Box<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    /// Allow up to `n` trials in flight (at least one).
    pub fn with_max_in_flight(mut self, n: usize) -> Self {
        self.max_in_flight = n.max(1);
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Number of trials currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// True once every genotype of the population has been scored.
    pub fn is_complete(&self, population: &Population) -> bool {
        self.in_flight.is_empty() && population.remaining() == 0
    }

    /// One scheduling tick.
    ///
    /// Spawns individuals into free slots, then advances each running trial
    /// by `dt`. Finished trials are inserted into the ledger immediately and
    /// returned in completion order.
    pub fn tick(
        &mut self,
        population: &mut Population,
        ledger: &mut FitnessLedger,
        rng: &mut GenomeRng,
        dt: f32,
    ) -> Result<Vec<TrialOutcome>, EvolutionError> {
        while self.in_flight.len() < self.max_in_flight {
            let id = self.next_id;
            let Some(individual) = population.spawn_next(id, rng.rng()) else {
                break;
            };
            self.next_id += 1;

            let individual = individual.clone();
            let handle = self.presenter.instantiate(&individual);
            let trial = self.runner.start(&individual);
            self.in_flight.push(InFlight {
                individual,
                trial,
                handle,
                elapsed: 0.0,
            });
        }

        let mut outcomes = Vec::new();
        let mut i = 0;
        while i < self.in_flight.len() {
            let slot = &mut self.in_flight[i];
            slot.elapsed += dt;
            match slot.trial.poll(dt) {
                TrialStatus::Running => i += 1,
                TrialStatus::Finished(fitness) => {
                    let done = self.in_flight.remove(i);
                    self.presenter.destroy(done.handle);

                    if !fitness.is_finite() || fitness < 0.0 {
                        return Err(EvolutionError::InvalidFitness {
                            name: done.individual.name,
                            fitness,
                        });
                    }

                    debug!(
                        "{} : {:.3} ({:.2}s simulated)",
                        done.individual.name, fitness, done.elapsed
                    );
                    let id = done.individual.id;
                    let name = done.individual.name.clone();
                    let rank = ledger.insert(fitness, done.individual);
                    outcomes.push(TrialOutcome {
                        id,
                        name,
                        fitness,
                        rank,
                    });
                }
            }
        }

        Ok(outcomes)
    }

    /// Discard every running trial without recording a fitness.
    ///
    /// Returns the number of trials dropped.
    pub fn cancel(&mut self) -> usize {
        let dropped = self.in_flight.len();
        for slot in self.in_flight.drain(..) {
            warn!(
                "discarding unfinished trial of {} after {:.2}s",
                slot.individual.name, slot.elapsed
            );
            self.presenter.destroy(slot.handle);
        }
        dropped
    }
}
