//! Compute module - evolution engine and the built-in table trial.

pub mod evolution;
mod table;

pub use table::*;
