//! Configuration types for an evolution run.
//!
//! Everything is read once at startup and never changes afterwards. Use
//! [`EvolutionConfig::validate`] to reject inconsistent settings before a
//! controller is built.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration for an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Number of generations to run before stopping.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Number of genotypes tested per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Probability that a breeding draw produces a mutant (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f32,
    /// Probability that a parent pair is crossed (0.0-1.0).
    /// Only consulted with [`CrossoverPolicy::Probabilistic`].
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f32,
    /// How parent pairs are recombined.
    #[serde(default)]
    pub crossover_policy: CrossoverPolicy,
    /// Number of best individuals carried over unchanged.
    #[serde(default = "default_elitism")]
    pub elitism: usize,
    /// Number of parents picked each generation (elites included).
    #[serde(default = "default_selection_size")]
    pub selection_size: usize,
    /// Radius of the table surface creatures are placed on.
    #[serde(default = "default_table_radius")]
    pub table_radius: f32,
    /// Height above the table at which creatures spawn.
    #[serde(default = "default_spawn_height")]
    pub spawn_height: f32,
    /// Where the angle mutation centres its neighbourhood.
    #[serde(default)]
    pub angle_mutation: AngleMutation,
    /// Give up rejecting duplicate clones after this many consecutive tries.
    #[serde(default = "default_max_duplicate_retries")]
    pub max_duplicate_retries: usize,
    /// Number of trials allowed in flight at once.
    #[serde(default = "default_max_concurrent_trials")]
    pub max_concurrent_trials: usize,
    /// Simulated seconds advanced per controller tick.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f32,
    /// Append `<generation>,<mean fitness>` lines to `output_path`.
    #[serde(default)]
    pub persist_to_file: bool,
    /// Results file, recreated at startup when persisting.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Ranges for random genotypes and mutation neighbourhoods.
    #[serde(default)]
    pub constraints: GenotypeConstraints,
    /// Settings for the built-in table trial.
    #[serde(default)]
    pub trial: TrialConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generations: default_generations(),
            population_size: default_population_size(),
            mutation_rate: default_mutation_rate(),
            crossover_rate: default_crossover_rate(),
            crossover_policy: CrossoverPolicy::default(),
            elitism: default_elitism(),
            selection_size: default_selection_size(),
            table_radius: default_table_radius(),
            spawn_height: default_spawn_height(),
            angle_mutation: AngleMutation::default(),
            max_duplicate_retries: default_max_duplicate_retries(),
            max_concurrent_trials: default_max_concurrent_trials(),
            tick_seconds: default_tick_seconds(),
            persist_to_file: false,
            output_path: default_output_path(),
            constraints: GenotypeConstraints::default(),
            trial: TrialConfig::default(),
            random_seed: None,
        }
    }
}

fn default_generations() -> usize {
    10
}
fn default_population_size() -> usize {
    20
}
fn default_mutation_rate() -> f32 {
    0.3
}
fn default_crossover_rate() -> f32 {
    0.5
}
fn default_elitism() -> usize {
    2
}
fn default_selection_size() -> usize {
    10
}
fn default_table_radius() -> f32 {
    0.38
}
fn default_spawn_height() -> f32 {
    0.05
}
fn default_max_duplicate_retries() -> usize {
    1000
}
fn default_max_concurrent_trials() -> usize {
    1
}
fn default_tick_seconds() -> f32 {
    1.0 / 60.0
}
fn default_output_path() -> PathBuf {
    PathBuf::from("results.csv")
}

/// Recombination policy for selected parent pairs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CrossoverPolicy {
    /// Every pair is crossed; `crossover_rate` is ignored.
    #[default]
    Always,
    /// A pair is crossed with probability `crossover_rate`, otherwise both
    /// parents pass through as clones.
    Probabilistic,
}

/// Centre of the neighbourhood sampled when the angle locus mutates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AngleMutation {
    /// New x is drawn around the current y component.
    #[default]
    CrossAxis,
    /// New x is drawn around the current x component.
    SameAxis,
}

/// Sampling ranges for genotype loci.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenotypeConstraints {
    /// Initial mass range.
    #[serde(default = "default_mass_bounds")]
    pub mass_bounds: (f32, f32),
    /// Initial range shared by size x and y.
    #[serde(default = "default_size_xy_bounds")]
    pub size_xy_bounds: (f32, f32),
    /// Initial size z range.
    #[serde(default = "default_size_z_bounds")]
    pub size_z_bounds: (f32, f32),
    /// Initial angle x range (degrees).
    #[serde(default = "default_angle_bounds")]
    pub angle_bounds: (f32, f32),
    /// Initial torque z range.
    #[serde(default = "default_force_bounds")]
    pub force_bounds: (f32, f32),
    /// Half-width of the mass mutation neighbourhood.
    #[serde(default = "default_mass_step")]
    pub mass_step: f32,
    /// Half-width of the per-component size mutation neighbourhood.
    #[serde(default = "default_size_step")]
    pub size_step: f32,
    /// Half-width of the angle mutation neighbourhood.
    #[serde(default = "default_angle_step")]
    pub angle_step: f32,
    /// Half-width of the torque mutation neighbourhood.
    #[serde(default = "default_force_step")]
    pub force_step: f32,
    /// Mass never mutates below this.
    #[serde(default = "default_min_mass")]
    pub min_mass: f32,
}

impl Default for GenotypeConstraints {
    fn default() -> Self {
        Self {
            mass_bounds: default_mass_bounds(),
            size_xy_bounds: default_size_xy_bounds(),
            size_z_bounds: default_size_z_bounds(),
            angle_bounds: default_angle_bounds(),
            force_bounds: default_force_bounds(),
            mass_step: default_mass_step(),
            size_step: default_size_step(),
            angle_step: default_angle_step(),
            force_step: default_force_step(),
            min_mass: default_min_mass(),
        }
    }
}

fn default_mass_bounds() -> (f32, f32) {
    (1.0, 10.0)
}
fn default_size_xy_bounds() -> (f32, f32) {
    (2.0, 6.0)
}
fn default_size_z_bounds() -> (f32, f32) {
    (0.5, 3.0)
}
fn default_angle_bounds() -> (f32, f32) {
    (-20.0, 20.0)
}
fn default_force_bounds() -> (f32, f32) {
    (0.0, 1000.0)
}
fn default_mass_step() -> f32 {
    2.5
}
fn default_size_step() -> f32 {
    1.0
}
fn default_angle_step() -> f32 {
    10.0
}
fn default_force_step() -> f32 {
    50.0
}
fn default_min_mass() -> f32 {
    0.01
}

/// Settings for the built-in table trial runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Downward acceleration once off the table.
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// The trial ends once vertical velocity drops to this value.
    #[serde(default = "default_fall_velocity")]
    pub fall_velocity: f32,
    /// Trials still running after this many seconds are scored as-is.
    #[serde(default = "default_max_seconds")]
    pub max_seconds: f32,
    /// Rolling resistance per shape (sphere, disc, torus).
    #[serde(default = "default_rolling_resistance")]
    pub rolling_resistance: (f32, f32, f32),
    /// Standard deviation of per-step surface noise on speed.
    #[serde(default)]
    pub surface_noise: f32,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            fall_velocity: default_fall_velocity(),
            max_seconds: default_max_seconds(),
            rolling_resistance: default_rolling_resistance(),
            surface_noise: 0.0,
        }
    }
}

fn default_gravity() -> f32 {
    9.81
}
fn default_fall_velocity() -> f32 {
    -2.0
}
fn default_max_seconds() -> f32 {
    60.0
}
fn default_rolling_resistance() -> (f32, f32, f32) {
    (0.05, 0.4, 0.2)
}

// ============================================================================
// Validation
// ============================================================================

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must be at least 1")]
    PopulationTooSmall,
    #[error("Generation count must be at least 1")]
    NoGenerations,
    #[error("Elitism ({elitism}) must be smaller than the population size ({population_size})")]
    ElitismTooLarge {
        elitism: usize,
        population_size: usize,
    },
    #[error("Selection size ({selection_size}) must be at least the elitism ({elitism})")]
    SelectionBelowElitism {
        selection_size: usize,
        elitism: usize,
    },
    #[error("Selection size must be at least 1")]
    EmptySelection,
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidRate { name: &'static str, value: f32 },
    #[error("Table radius must be positive, got {0}")]
    InvalidTableRadius(f32),
    #[error("Tick length must be positive, got {0}")]
    InvalidTickSeconds(f32),
    #[error("At least one trial must be allowed in flight")]
    NoConcurrency,
    #[error("Output path must be set when persisting to file")]
    MissingOutputPath,
    #[error("Invalid parameter bounds: {0}")]
    InvalidBounds(String),
}

impl EvolutionConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::PopulationTooSmall);
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.elitism >= self.population_size {
            return Err(ConfigError::ElitismTooLarge {
                elitism: self.elitism,
                population_size: self.population_size,
            });
        }
        if self.selection_size < self.elitism {
            return Err(ConfigError::SelectionBelowElitism {
                selection_size: self.selection_size,
                elitism: self.elitism,
            });
        }
        if self.selection_size == 0 {
            return Err(ConfigError::EmptySelection);
        }

        let check_rate = |value: f32, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::InvalidRate { name, value })
            }
        };
        check_rate(self.mutation_rate, "mutation_rate")?;
        check_rate(self.crossover_rate, "crossover_rate")?;

        if !(self.table_radius > 0.0 && self.table_radius.is_finite()) {
            return Err(ConfigError::InvalidTableRadius(self.table_radius));
        }
        if !self.spawn_height.is_finite() {
            return Err(ConfigError::InvalidBounds(format!(
                "spawn_height ({}) must be finite",
                self.spawn_height
            )));
        }
        if !(self.tick_seconds > 0.0 && self.tick_seconds.is_finite()) {
            return Err(ConfigError::InvalidTickSeconds(self.tick_seconds));
        }
        if self.max_concurrent_trials == 0 {
            return Err(ConfigError::NoConcurrency);
        }
        if self.persist_to_file && self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutputPath);
        }

        self.constraints.validate()?;
        self.trial.validate()
    }
}

impl GenotypeConstraints {
    /// Validate sampling ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check_bounds = |bounds: (f32, f32), name: &str| {
            let (min, max) = bounds;
            // the sampler needs a finite width as well as finite ends
            if !(max - min).is_finite() {
                Err(ConfigError::InvalidBounds(format!(
                    "{} range [{}, {}] must be finite",
                    name, min, max
                )))
            } else if !(min <= max) {
                Err(ConfigError::InvalidBounds(format!(
                    "{} min ({}) > max ({})",
                    name, min, max
                )))
            } else {
                Ok(())
            }
        };

        check_bounds(self.mass_bounds, "mass")?;
        check_bounds(self.size_xy_bounds, "size_xy")?;
        check_bounds(self.size_z_bounds, "size_z")?;
        check_bounds(self.angle_bounds, "angle")?;
        check_bounds(self.force_bounds, "force")?;

        if self.mass_bounds.0 <= 0.0 {
            return Err(ConfigError::InvalidBounds(format!(
                "mass min ({}) must be positive",
                self.mass_bounds.0
            )));
        }
        if !(self.min_mass > 0.0 && self.min_mass.is_finite()) {
            return Err(ConfigError::InvalidBounds(format!(
                "min_mass ({}) must be positive",
                self.min_mass
            )));
        }

        let steps = [
            (self.mass_step, "mass_step"),
            (self.size_step, "size_step"),
            (self.angle_step, "angle_step"),
            (self.force_step, "force_step"),
        ];
        for (step, name) in steps {
            // mutation samples [centre - step, centre + step]
            if !(step >= 0.0) || !(2.0 * step).is_finite() {
                return Err(ConfigError::InvalidBounds(format!(
                    "{} ({}) must be a non-negative finite number",
                    name, step
                )));
            }
        }

        Ok(())
    }
}

impl TrialConfig {
    /// Validate trial settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_seconds <= 0.0 {
            return Err(ConfigError::InvalidBounds(format!(
                "trial max_seconds ({}) must be positive",
                self.max_seconds
            )));
        }
        if self.fall_velocity >= 0.0 {
            return Err(ConfigError::InvalidBounds(format!(
                "trial fall_velocity ({}) must be negative",
                self.fall_velocity
            )));
        }
        if self.surface_noise < 0.0 || !self.surface_noise.is_finite() {
            return Err(ConfigError::InvalidBounds(format!(
                "trial surface_noise ({}) must be a non-negative number",
                self.surface_noise
            )));
        }
        Ok(())
    }
}
