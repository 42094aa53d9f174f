//! Errors raised while running evolution.

use std::io;

use crate::schema::{ConfigError, GenotypeError};

/// Evolution run errors.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Genotype error: {0}")]
    Genotype(#[from] GenotypeError),
    #[error("Trial for {name} returned invalid fitness {fitness}")]
    InvalidFitness { name: String, fitness: f32 },
    #[error("Breeding needs at least one parent genotype")]
    EmptyBreedingPool,
    #[error("Ledger holds {found} entries, expected {expected}")]
    IncompleteLedger { expected: usize, found: usize },
    #[error("Recorder failed: {0}")]
    Recorder(#[from] io::Error),
}
