//! Genotype manipulation utilities for evolutionary search.
//!
//! Provides random generation, single-locus mutation and one-point crossover.

use rand::prelude::*;

use crate::schema::{
    AngleMutation, EvolutionConfig, Genotype, GenotypeConstraints, LocusIndex, Shape, Vec3,
};

/// Everything needed to sample or perturb a genotype.
#[derive(Debug, Clone)]
pub struct GenotypeSpace {
    pub constraints: GenotypeConstraints,
    pub table_radius: f32,
    pub spawn_height: f32,
    pub angle_mutation: AngleMutation,
}

impl GenotypeSpace {
    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self {
            constraints: config.constraints.clone(),
            table_radius: config.table_radius,
            spawn_height: config.spawn_height,
            angle_mutation: config.angle_mutation,
        }
    }
}

impl Default for GenotypeSpace {
    fn default() -> Self {
        Self::from_config(&EvolutionConfig::default())
    }
}

/// Random number generator wrapper for genotype operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a random genotype within the space.
    pub fn random_genotype(&mut self, space: &GenotypeSpace) -> Genotype {
        let c = &space.constraints;

        let shape = self.random_shape();
        let mass = self.uniform(c.mass_bounds);
        // x and y share one draw so the footprint stays round
        let size_xy = self.uniform(c.size_xy_bounds);
        let size = Vec3::new(size_xy, size_xy, self.uniform(c.size_z_bounds));
        let initial_position = self.random_position(space);
        let initial_force = Vec3::new(0.0, 0.0, self.uniform(c.force_bounds));
        let initial_angle = Vec3::new(self.uniform(c.angle_bounds), 0.0, 0.0);

        Genotype {
            shape,
            mass,
            size,
            initial_angle,
            initial_position,
            initial_force,
        }
    }

    /// Generate `n` independent random genotypes.
    pub fn initial_population(&mut self, n: usize, space: &GenotypeSpace) -> Vec<Genotype> {
        (0..n).map(|_| self.random_genotype(space)).collect()
    }

    fn random_shape(&mut self) -> Shape {
        Shape::ALL[self.rng.gen_range(0..Shape::ALL.len())]
    }

    /// Spawn point on the table's radial axis, independent of any parent.
    fn random_position(&mut self, space: &GenotypeSpace) -> Vec3 {
        Vec3::new(
            0.0,
            space.spawn_height,
            self.rng.gen_range(0.0..space.table_radius),
        )
    }

    /// Replace one locus with a value from its mutation neighbourhood.
    ///
    /// All other loci are left untouched.
    pub fn mutate_locus(&mut self, genotype: &mut Genotype, locus: LocusIndex, space: &GenotypeSpace) {
        let c = &space.constraints;

        match locus {
            LocusIndex::Shape => genotype.shape = self.random_shape(),
            LocusIndex::Mass => {
                genotype.mass = self.around(genotype.mass, c.mass_step).max(c.min_mass);
            }
            LocusIndex::Size => {
                let s = genotype.size;
                genotype.size = Vec3::new(
                    self.around(s.x, c.size_step),
                    self.around(s.y, c.size_step),
                    self.around(s.z, c.size_step),
                );
            }
            LocusIndex::Angle => {
                let centre = match space.angle_mutation {
                    AngleMutation::CrossAxis => genotype.initial_angle.y,
                    AngleMutation::SameAxis => genotype.initial_angle.x,
                };
                genotype.initial_angle = Vec3::new(self.around(centre, c.angle_step), 0.0, 0.0);
            }
            LocusIndex::Position => genotype.initial_position = self.random_position(space),
            LocusIndex::Force => {
                let z = self.around(genotype.initial_force.z, c.force_step);
                genotype.initial_force = Vec3::new(0.0, 0.0, z);
            }
        }
    }

    /// Clone a genotype and mutate one randomly chosen locus.
    pub fn mutant(&mut self, parent: &Genotype, space: &GenotypeSpace) -> (Genotype, LocusIndex) {
        let locus = self.random_locus();
        let mut child = parent.clone();
        self.mutate_locus(&mut child, locus, space);
        (child, locus)
    }

    /// Uniformly pick one of the six loci.
    pub fn random_locus(&mut self) -> LocusIndex {
        LocusIndex::ALL[self.rng.gen_range(0..LocusIndex::COUNT)]
    }

    /// One-point crossover at a random cut in `1..6`.
    ///
    /// Returns both offspring and the cut point.
    pub fn crossover(&mut self, parent1: &Genotype, parent2: &Genotype) -> (Genotype, Genotype, usize) {
        let point = self.rng.gen_range(1..LocusIndex::COUNT);
        let (a, b) = one_point_crossover(parent1, parent2, point);
        (a, b, point)
    }

    /// Uniform random in inclusive bounds.
    fn uniform(&mut self, bounds: (f32, f32)) -> f32 {
        self.rng.gen_range(bounds.0..=bounds.1)
    }

    /// Uniform random in `[centre - half_width, centre + half_width]`.
    fn around(&mut self, centre: f32, half_width: f32) -> f32 {
        self.uniform((centre - half_width, centre + half_width))
    }

    /// Uniform sample in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.rng.r#gen()
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Access the underlying generator.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

/// Swap loci `[0, point)` between clones of two parents.
///
/// Loci `[point, 6)` stay with their original parent. `point` is capped at
/// the locus count.
pub fn one_point_crossover(parent1: &Genotype, parent2: &Genotype, point: usize) -> (Genotype, Genotype) {
    let mut g1 = parent1.clone();
    let mut g2 = parent2.clone();
    for &locus in &LocusIndex::ALL[..point.min(LocusIndex::COUNT)] {
        g1.swap_locus(&mut g2, locus);
    }
    (g1, g2)
}
