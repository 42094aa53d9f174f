//! Simplified table-balance trial.
//!
//! A creature is dropped on a circular table along its radial axis and spun
//! by its initial torque. It rolls outward (or inward, through the centre),
//! slowed by shape-dependent rolling resistance and pushed by its tilt. Once
//! past the rim it falls; the trial ends when its vertical velocity reaches
//! `fall_velocity`, and the fitness is the simulated time survived. A
//! creature that comes to rest on the table is scored `max_seconds`.

use rand::prelude::*;
use rand_distr::Normal;

use crate::schema::{EvolutionConfig, Genotype, Shape, TrialConfig};

use super::evolution::{Individual, Trial, TrialRunner, TrialStatus};

/// Scale from genotype size units to metres.
const SIZE_TO_METRES: f32 = 0.01;
/// Fraction of the torque delivered as a one-frame impulse.
const TORQUE_IMPULSE: f32 = 1.0e-4;
/// Share of the tilt's gravity component that drives rolling.
const TILT_COUPLING: f32 = 0.1;

/// Rotational inertia factor `I / (m r^2)`.
fn inertia_factor(shape: Shape) -> f32 {
    match shape {
        Shape::Sphere => 0.4,
        Shape::Disc => 0.5,
        Shape::Torus => 1.0,
    }
}

/// Runs [`TableTrial`]s.
pub struct TableTrialRunner {
    config: TrialConfig,
    table_radius: f32,
    noise: Option<Normal<f32>>,
    rng: StdRng,
}

impl TableTrialRunner {
    pub fn new(config: TrialConfig, table_radius: f32, seed: u64) -> Self {
        let noise = if config.surface_noise > 0.0 {
            Normal::new(0.0, config.surface_noise).ok()
        } else {
            None
        };
        Self {
            config,
            table_radius,
            noise,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build from the run configuration, seeding from `random_seed`.
    pub fn from_config(config: &EvolutionConfig) -> Self {
        let seed = config
            .random_seed
            .map(|s| s.wrapping_add(1))
            .unwrap_or_else(rand::random);
        Self::new(config.trial.clone(), config.table_radius, seed)
    }
}

impl TrialRunner for TableTrialRunner {
    type Trial = TableTrial;

    fn start(&mut self, individual: &Individual) -> TableTrial {
        TableTrial::new(
            &individual.genotype,
            &self.config,
            self.table_radius,
            self.noise,
            StdRng::seed_from_u64(self.rng.r#gen()),
        )
    }
}

/// One creature on the table.
pub struct TableTrial {
    config: TrialConfig,
    table_radius: f32,
    /// Signed distance from the table centre along the radial axis.
    position: f32,
    /// Rolling speed along the radial axis.
    speed: f32,
    /// Vertical velocity; zero while supported by the table.
    vertical_velocity: f32,
    /// Constant acceleration from the tilt.
    tilt_accel: f32,
    /// Deceleration magnitude from rolling resistance.
    resistance: f32,
    elapsed: f32,
    noise: Option<Normal<f32>>,
    rng: StdRng,
}

impl TableTrial {
    pub fn new(
        genotype: &Genotype,
        config: &TrialConfig,
        table_radius: f32,
        noise: Option<Normal<f32>>,
        rng: StdRng,
    ) -> Self {
        let radius = (genotype.size.x.abs() * 0.5 * SIZE_TO_METRES).max(1e-3);
        let mass = genotype.mass.max(1e-3);
        let speed = genotype.initial_force.z * TORQUE_IMPULSE
            / (inertia_factor(genotype.shape) * mass * radius);

        // a sphere has no preferred axis to lean on
        let tilt_accel = match genotype.shape {
            Shape::Sphere => 0.0,
            Shape::Disc | Shape::Torus => {
                config.gravity * genotype.initial_angle.x.to_radians().sin() * TILT_COUPLING
            }
        };

        let (sphere, disc, torus) = config.rolling_resistance;
        let coefficient = match genotype.shape {
            Shape::Sphere => sphere,
            Shape::Disc => disc,
            Shape::Torus => torus,
        };

        Self {
            config: config.clone(),
            table_radius,
            position: genotype.initial_position.z,
            speed,
            vertical_velocity: 0.0,
            tilt_accel,
            resistance: coefficient * config.gravity,
            elapsed: 0.0,
            noise,
            rng,
        }
    }

    pub fn on_table(&self) -> bool {
        self.position.abs() <= self.table_radius
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn roll(&mut self, dt: f32) {
        let mut speed = self.speed + self.tilt_accel * dt;

        // resistance brakes toward zero without reversing
        let brake = self.resistance * dt;
        speed = if speed.abs() <= brake {
            0.0
        } else {
            speed - brake * speed.signum()
        };

        if let Some(noise) = self.noise {
            speed += noise.sample(&mut self.rng) * dt;
        }

        self.speed = speed;
        self.position += speed * dt;
    }
}

impl Trial for TableTrial {
    fn poll(&mut self, dt: f32) -> TrialStatus {
        self.elapsed += dt;

        if self.on_table() {
            self.roll(dt);
        } else {
            self.position += self.speed * dt;
            self.vertical_velocity -= self.config.gravity * dt;
        }

        if self.vertical_velocity <= self.config.fall_velocity {
            TrialStatus::Finished(self.elapsed)
        } else if self.elapsed >= self.config.max_seconds {
            TrialStatus::Finished(self.config.max_seconds)
        } else {
            TrialStatus::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Vec3;

    fn genotype(shape: Shape, force_z: f32, position_z: f32) -> Genotype {
        Genotype {
            shape,
            mass: 5.0,
            size: Vec3::new(4.0, 4.0, 1.0),
            initial_angle: Vec3::ZERO,
            initial_position: Vec3::new(0.0, 0.05, position_z),
            initial_force: Vec3::new(0.0, 0.0, force_z),
        }
    }

    fn run(trial: &mut TableTrial, dt: f32) -> f32 {
        loop {
            if let TrialStatus::Finished(fitness) = trial.poll(dt) {
                return fitness;
            }
        }
    }

    fn trial(g: &Genotype, config: &TrialConfig) -> TableTrial {
        TableTrial::new(g, config, 0.38, None, StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_resting_creature_hits_timeout() {
        let config = TrialConfig {
            max_seconds: 5.0,
            ..Default::default()
        };
        let mut t = trial(&genotype(Shape::Disc, 0.0, 0.1), &config);
        let fitness = run(&mut t, 1.0 / 60.0);
        assert_eq!(fitness, 5.0);
        assert!(t.on_table());
    }

    #[test]
    fn test_fast_spin_falls_off() {
        let config = TrialConfig::default();
        let mut t = trial(&genotype(Shape::Sphere, 1000.0, 0.3), &config);
        let fitness = run(&mut t, 1.0 / 60.0);
        assert!(fitness < config.max_seconds);
        assert!(!t.on_table());
    }

    #[test]
    fn test_fall_takes_time_to_reach_threshold() {
        // starting past the rim, the fall alone takes |fall_velocity| / g
        let config = TrialConfig::default();
        let mut t = trial(&genotype(Shape::Sphere, 0.0, 0.5), &config);
        let fitness = run(&mut t, 0.001);
        let expected = -config.fall_velocity / config.gravity;
        assert!((fitness - expected).abs() < 0.01);
    }

    #[test]
    fn test_runner_is_reproducible() {
        let config = TrialConfig {
            surface_noise: 0.5,
            ..Default::default()
        };
        let g = genotype(Shape::Torus, 600.0, 0.2);
        let individual = Individual {
            id: 0,
            name: "TorusAAAAA".into(),
            generation: 0,
            genotype: g,
        };

        let mut a = TableTrialRunner::new(config.clone(), 0.38, 7);
        let mut b = TableTrialRunner::new(config, 0.38, 7);
        let fa = run(&mut a.start(&individual), 1.0 / 60.0);
        let fb = run(&mut b.start(&individual), 1.0 / 60.0);
        assert_eq!(fa, fb);
    }
}
