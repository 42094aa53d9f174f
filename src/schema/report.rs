//! Progress and result types handed to recorders and callers.

use serde::{Deserialize, Serialize};

use super::Genotype;

/// Statistics for one fully evaluated generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationSummary {
    /// Generation number, starting at 0.
    pub generation: usize,
    /// Mean fitness over every scored individual.
    pub mean_fitness: f32,
    /// Greatest fitness of the generation.
    pub best_fitness: f32,
    /// Smallest fitness of the generation.
    pub worst_fitness: f32,
    /// Population standard deviation of fitness.
    pub fitness_std: f32,
    /// Number of individuals scored.
    pub evaluations: usize,
}

/// A genotype together with the fitness it achieved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredGenotype {
    /// Display name of the individual.
    pub name: String,
    /// Generation it was evaluated in.
    pub generation: usize,
    pub fitness: f32,
    pub genotype: Genotype,
}

/// Current phase of the generation state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvolutionPhase {
    /// Materializing the next population.
    #[default]
    Populating,
    /// Running trials.
    Evaluating,
    /// Selection, crossover and mutation.
    Breeding,
    /// Moving to the next generation.
    Advancing,
    /// Evolution complete.
    Finished,
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Reached the configured number of generations.
    MaxGenerations,
    /// Cancelled by the caller.
    Cancelled,
}

/// Final result of an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Number of generations fully evaluated.
    pub generations: usize,
    /// Total trials that produced a fitness.
    pub total_evaluations: u64,
    /// Fittest individual seen over the whole run.
    pub best: Option<ScoredGenotype>,
    /// One summary per completed generation.
    pub history: Vec<GenerationSummary>,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}
