//! Append-only results file.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::Recorder;
use crate::schema::GenerationSummary;

/// Writes `<generation>,<mean fitness>` per generation.
///
/// Usage:
/// ```ignore
/// let mut recorder = CsvRecorder::create("results.csv")?;
/// recorder.generation_completed(&summary)?;
/// ```
pub struct CsvRecorder {
    writer: BufWriter<File>,
    path: PathBuf,
    lines_written: u64,
}

impl CsvRecorder {
    /// Create the results file, replacing any previous one.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            lines_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of generation lines written so far.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }
}

impl Recorder for CsvRecorder {
    fn generation_completed(&mut self, summary: &GenerationSummary) -> io::Result<()> {
        writeln!(
            self.writer,
            "{},{}",
            summary.generation, summary.mean_fitness
        )?;
        // flush per line so the file is readable while the run continues
        self.writer.flush()?;
        self.lines_written += 1;
        Ok(())
    }
}
