//! Generational genetic algorithm for table-balancing creatures.
//!
//! # Overview
//!
//! One generation runs through four phases, driven by
//! [`GenerationController::tick`]:
//!
//! - **Populating**: the pending genotypes become the current [`Population`]
//! - **Evaluating**: each individual is spawned and run as a [`Trial`]; its
//!   fitness lands in the [`FitnessLedger`]
//! - **Breeding**: the [`Breeder`] turns the ledger into the next genotypes
//!   (elitism, roulette selection, crossover, mutation)
//! - **Advancing**: statistics are recorded and the generation counter moves on
//!
//! # Example
//!
//! ```rust,no_run
//! use creature_evolution::compute::TableTrialRunner;
//! use creature_evolution::compute::evolution::GenerationController;
//! use creature_evolution::schema::EvolutionConfig;
//!
//! let config = EvolutionConfig::default();
//! let runner = TableTrialRunner::from_config(&config);
//! let mut controller = GenerationController::new(config, runner).unwrap();
//!
//! let result = controller.run().unwrap();
//! if let Some(best) = result.best {
//!     println!("Best fitness: {:.3}", best.fitness);
//! }
//! ```
//!
//! # Trials
//!
//! Trials are polled, never blocked on. A [`TrialRunner`] starts one trial per
//! individual; the [`Evaluator`] keeps up to `max_concurrent_trials` in flight
//! and polls them once per controller tick.

mod breeder;
mod controller;
mod error;
mod evaluator;
mod genome;
mod ledger;
mod population;

pub use breeder::{Breeder, BreedingParams, Selection, roulette_bounds, roulette_pick};
pub use controller::GenerationController;
pub use error::EvolutionError;
pub use evaluator::{
    Evaluator, LogPresenter, NullPresenter, Presenter, PresenterHandle, Trial, TrialOutcome,
    TrialRunner, TrialStatus,
};
pub use genome::{GenomeRng, GenotypeSpace, one_point_crossover};
pub use ledger::{FitnessLedger, LedgerEntry, LedgerStats};
pub use population::{Individual, Population};
