//! The live population of one generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::schema::Genotype;

const NAME_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const NAME_SUFFIX_LEN: usize = 5;

/// A genotype under test, with a unique id and a display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Individual {
    /// Unique identifier; identity for selection de-duplication.
    pub id: u64,
    /// Display name, e.g. `DiscQ7Z0K`.
    pub name: String,
    /// Generation the individual was tested in.
    pub generation: usize,
    pub genotype: Genotype,
}

impl Individual {
    /// Create an individual with a freshly drawn display name.
    pub fn new<R: Rng>(id: u64, generation: usize, genotype: Genotype, rng: &mut R) -> Self {
        let name = display_name(&genotype, rng);
        Self {
            id,
            name,
            generation,
            genotype,
        }
    }
}

/// `<shape><five random alphanumerics>`.
fn display_name<R: Rng>(genotype: &Genotype, rng: &mut R) -> String {
    let suffix: String = (0..NAME_SUFFIX_LEN)
        .map(|_| NAME_CHARS[rng.gen_range(0..NAME_CHARS.len())] as char)
        .collect();
    format!("{}{}", genotype.shape, suffix)
}

/// Genotypes pending evaluation in the current generation, and the
/// individuals spawned from them so far.
#[derive(Debug, Clone, Default)]
pub struct Population {
    generation: usize,
    genotypes: Vec<Genotype>,
    individuals: Vec<Individual>,
}

impl Population {
    /// Start a generation from its genotype list.
    pub fn new(generation: usize, genotypes: Vec<Genotype>) -> Self {
        Self {
            generation,
            individuals: Vec::with_capacity(genotypes.len()),
            genotypes,
        }
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Number of genotypes in this generation.
    pub fn len(&self) -> usize {
        self.genotypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genotypes.is_empty()
    }

    pub fn genotypes(&self) -> &[Genotype] {
        &self.genotypes
    }

    /// Individuals spawned so far, in spawn order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Number of genotypes not yet spawned.
    pub fn remaining(&self) -> usize {
        self.genotypes.len() - self.individuals.len()
    }

    /// Spawn the next pending genotype as an individual.
    ///
    /// Returns `None` once every genotype has been spawned.
    pub fn spawn_next<R: Rng>(&mut self, id: u64, rng: &mut R) -> Option<&Individual> {
        let genotype = self.genotypes.get(self.individuals.len())?.clone();
        self.individuals
            .push(Individual::new(id, self.generation, genotype, rng));
        self.individuals.last()
    }
}
