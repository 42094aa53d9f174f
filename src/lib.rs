//! Creature Evolution - a generational genetic algorithm for table balancing.
//!
//! Creatures are described by a six-locus genotype (shape, mass, size,
//! initial angle, position and force). Each generation every creature is
//! dropped onto a round table; the longer it stays on, the fitter it is.
//! Fitter creatures are more likely to pass their loci on.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Genotype, configuration and report types
//! - `compute`: The evolution engine and the built-in table trial
//! - `recording`: Scoreboard and per-generation statistics sinks
//!
//! # Example
//!
//! ```rust,no_run
//! use creature_evolution::{
//!     schema::EvolutionConfig,
//!     compute::{TableTrialRunner, evolution::GenerationController},
//!     recording::LogRecorder,
//! };
//!
//! let config = EvolutionConfig {
//!     generations: 5,
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//! let runner = TableTrialRunner::from_config(&config);
//! let mut controller = GenerationController::new(config, runner)
//!     .unwrap()
//!     .with_recorder(Box::new(LogRecorder));
//!
//! let result = controller.run().unwrap();
//! if let Some(best) = result.best {
//!     println!("{} : {:.3}", best.name, best.fitness);
//! }
//! ```

pub mod compute;
pub mod recording;
pub mod schema;

// Re-export commonly used types
pub use compute::TableTrialRunner;
pub use compute::evolution::{EvolutionError, GenerationController};
pub use schema::{EvolutionConfig, EvolutionResult, Genotype};
