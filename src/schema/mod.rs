//! Schema module - Configuration, genotype and report types.

mod config;
mod genotype;
mod report;

pub use config::*;
pub use genotype::*;
pub use report::*;
