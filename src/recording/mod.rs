//! Recording of per-generation statistics.
//!
//! Recorders receive read-only data from the generation controller: one
//! call per scored trial (the live scoreboard) and one per completed
//! generation.
//!
//! # File Format
//!
//! [`CsvRecorder`] writes one line per generation, no header:
//!
//! ```text
//! <generation>,<mean fitness>
//! ```

mod csv;

pub use csv::CsvRecorder;

use std::io;

use log::info;

use crate::compute::evolution::TrialOutcome;
use crate::schema::GenerationSummary;

/// Sink for evolution statistics.
pub trait Recorder {
    /// Called as soon as a trial has been scored.
    fn trial_scored(&mut self, _generation: usize, _outcome: &TrialOutcome) -> io::Result<()> {
        Ok(())
    }

    /// Called once per generation, after every individual has been scored.
    fn generation_completed(&mut self, summary: &GenerationSummary) -> io::Result<()>;
}

/// Scoreboard and mean-fitness list written to the log.
#[derive(Debug, Default)]
pub struct LogRecorder;

impl Recorder for LogRecorder {
    fn trial_scored(&mut self, generation: usize, outcome: &TrialOutcome) -> io::Result<()> {
        info!(
            "[gen {}] {} : {:.3}",
            generation, outcome.name, outcome.fitness
        );
        Ok(())
    }

    fn generation_completed(&mut self, summary: &GenerationSummary) -> io::Result<()> {
        info!(
            "Generation {} : {:.3} (best {:.3}, std {:.3})",
            summary.generation, summary.mean_fitness, summary.best_fitness, summary.fitness_std
        );
        Ok(())
    }
}

/// Keeps every summary and scoreboard line in memory.
#[derive(Debug, Default)]
pub struct HistoryRecorder {
    pub summaries: Vec<GenerationSummary>,
    pub scoreboard: Vec<(usize, String, f32)>,
}

impl Recorder for HistoryRecorder {
    fn trial_scored(&mut self, generation: usize, outcome: &TrialOutcome) -> io::Result<()> {
        self.scoreboard
            .push((generation, outcome.name.clone(), outcome.fitness));
        Ok(())
    }

    fn generation_completed(&mut self, summary: &GenerationSummary) -> io::Result<()> {
        self.summaries.push(summary.clone());
        Ok(())
    }
}
