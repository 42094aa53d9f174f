//! Selection, crossover and mutation.
//!
//! One breeding cycle turns a complete [`FitnessLedger`] into the genotype
//! list of the next generation:
//!
//! 1. **Selection** keeps the `elitism` best individuals and fills the rest of
//!    the `selection_size` parents by roulette wheel over the remaining ranks.
//! 2. **Crossover** pairs parents at random and applies one-point crossover.
//! 3. **Mutation** draws `population_size - elitism` genotypes from the
//!    offspring, mutating one locus with probability `mutation_rate` and
//!    otherwise cloning, rejecting clones that are already present.
//!
//! The elites' genotypes are prepended unchanged, so the result always holds
//! exactly `population_size` genotypes.

use log::{debug, trace, warn};

use crate::schema::{CrossoverPolicy, EvolutionConfig, Genotype};

use super::error::EvolutionError;
use super::genome::{GenomeRng, GenotypeSpace};
use super::ledger::FitnessLedger;
use super::population::Individual;

/// Parameters of one breeding cycle.
#[derive(Debug, Clone)]
pub struct BreedingParams {
    pub population_size: usize,
    pub elitism: usize,
    pub selection_size: usize,
    pub mutation_rate: f32,
    pub crossover_rate: f32,
    pub crossover_policy: CrossoverPolicy,
    pub max_duplicate_retries: usize,
}

impl BreedingParams {
    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self {
            population_size: config.population_size,
            elitism: config.elitism,
            selection_size: config.selection_size,
            mutation_rate: config.mutation_rate,
            crossover_rate: config.crossover_rate,
            crossover_policy: config.crossover_policy,
            max_duplicate_retries: config.max_duplicate_retries,
        }
    }
}

/// Output of the selection step.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Selected parents, de-duplicated by individual id.
    pub parents: Vec<Individual>,
    /// Genotypes of the elites, best first, carried over verbatim.
    pub elites: Vec<Genotype>,
}

/// Produces the next generation from a scored one.
#[derive(Debug, Clone)]
pub struct Breeder {
    params: BreedingParams,
    space: GenotypeSpace,
}

impl Breeder {
    pub fn new(params: BreedingParams, space: GenotypeSpace) -> Self {
        Self { params, space }
    }

    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self::new(
            BreedingParams::from_config(config),
            GenotypeSpace::from_config(config),
        )
    }

    pub fn params(&self) -> &BreedingParams {
        &self.params
    }

    /// Run selection, crossover and mutation.
    ///
    /// Returns exactly `population_size` genotypes, elites first.
    pub fn breed(
        &self,
        ledger: &FitnessLedger,
        rng: &mut GenomeRng,
    ) -> Result<Vec<Genotype>, EvolutionError> {
        let Selection { parents, elites } = self.select(ledger, rng)?;
        debug!(
            "selected {} parents ({} elites)",
            parents.len(),
            elites.len()
        );

        let offspring = self.crossover(parents, rng);
        let mutated = self.mutate(&offspring, rng)?;

        let mut next = elites;
        next.extend(mutated);
        Ok(next)
    }

    /// Elitism followed by roulette-wheel selection.
    pub fn select(
        &self,
        ledger: &FitnessLedger,
        rng: &mut GenomeRng,
    ) -> Result<Selection, EvolutionError> {
        let expected = self.params.population_size;
        if ledger.len() != expected {
            return Err(EvolutionError::IncompleteLedger {
                expected,
                found: ledger.len(),
            });
        }

        let elitism = self.params.elitism;
        let mut parents: Vec<Individual> = Vec::with_capacity(self.params.selection_size);
        let mut elites = Vec::with_capacity(elitism);
        for entry in ledger.top(elitism) {
            elites.push(entry.individual.genotype.clone());
            parents.push(entry.individual.clone());
        }

        // Remaining entries, best first.
        let pool: Vec<_> = ledger.below_top(elitism).collect();
        let draws = self.params.selection_size.saturating_sub(elitism);
        if draws > 0 && !pool.is_empty() {
            let weights: Vec<f32> = pool.iter().map(|e| e.fitness).collect();
            let bounds = roulette_bounds(&weights);
            for _ in 0..draws {
                let sample = rng.unit();
                let pick = roulette_pick(&bounds, sample);
                trace!(
                    "roulette sample {:.4} -> {} ({:.3})",
                    sample, pool[pick].individual.name, pool[pick].fitness
                );
                parents.push(pool[pick].individual.clone());
            }
        }

        Ok(Selection {
            parents: dedup_by_id(parents),
            elites,
        })
    }

    /// Pair parents at random and recombine each pair.
    ///
    /// Consumes the parents; emits `2 * ceil(n / 2)` genotypes. An odd parent
    /// out is paired with itself.
    pub fn crossover(&self, mut parents: Vec<Individual>, rng: &mut GenomeRng) -> Vec<Genotype> {
        let mut offspring = Vec::with_capacity(parents.len() + 1);

        while !parents.is_empty() {
            let p1 = parents.swap_remove(rng.index(parents.len()));
            let p2 = if parents.is_empty() {
                p1.clone()
            } else {
                parents.swap_remove(rng.index(parents.len()))
            };

            let cross = match self.params.crossover_policy {
                CrossoverPolicy::Always => true,
                CrossoverPolicy::Probabilistic => rng.chance(self.params.crossover_rate),
            };

            if cross {
                let (g1, g2, point) = rng.crossover(&p1.genotype, &p2.genotype);
                trace!("crossover {} x {} at {}", p1.name, p2.name, point);
                offspring.push(g1);
                offspring.push(g2);
            } else {
                offspring.push(p1.genotype);
                offspring.push(p2.genotype);
            }
        }

        offspring
    }

    /// Fill `population_size - elitism` slots from the offspring.
    ///
    /// Mutants are always accepted. Unmutated clones are rejected while an
    /// equal genotype is already present, up to `max_duplicate_retries`
    /// consecutive rejections, after which the duplicate is accepted.
    pub fn mutate(
        &self,
        offspring: &[Genotype],
        rng: &mut GenomeRng,
    ) -> Result<Vec<Genotype>, EvolutionError> {
        let target = self.params.population_size - self.params.elitism;
        if target > 0 && offspring.is_empty() {
            return Err(EvolutionError::EmptyBreedingPool);
        }

        let mut out: Vec<Genotype> = Vec::with_capacity(target);
        let mut rejected = 0;
        while out.len() < target {
            let source = &offspring[rng.index(offspring.len())];

            if rng.chance(self.params.mutation_rate) {
                let (mutant, locus) = rng.mutant(source, &self.space);
                trace!("mutated {}", locus);
                out.push(mutant);
                rejected = 0;
            } else if !out.contains(source) {
                out.push(source.clone());
                rejected = 0;
            } else if rejected >= self.params.max_duplicate_retries {
                warn!(
                    "accepting duplicate genotype after {} rejected draws",
                    rejected
                );
                out.push(source.clone());
                rejected = 0;
            } else {
                rejected += 1;
            }
        }

        Ok(out)
    }
}

/// Cumulative selection bounds, one per weight, in the given order.
///
/// Each slice is proportional to its weight's share of the total; negative
/// weights count as zero. A non-positive total falls back to equal slices.
pub fn roulette_bounds(weights: &[f32]) -> Vec<f32> {
    let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
    let n = weights.len();

    if !(total > 0.0) {
        return (1..=n).map(|i| i as f32 / n as f32).collect();
    }

    let mut acc = 0.0;
    weights
        .iter()
        .map(|w| {
            acc += w.max(0.0) / total;
            acc
        })
        .collect()
}

/// Index of the first bound at or above `sample`.
///
/// A sample exactly equal to a bound selects that bound's owner. Samples
/// beyond the last bound (rounding) select the last entry.
pub fn roulette_pick(bounds: &[f32], sample: f32) -> usize {
    bounds
        .iter()
        .position(|&bound| sample <= bound)
        .unwrap_or(bounds.len().saturating_sub(1))
}

/// Keep the first occurrence of each individual id, preserving order.
fn dedup_by_id(individuals: Vec<Individual>) -> Vec<Individual> {
    let mut seen = std::collections::HashSet::with_capacity(individuals.len());
    individuals
        .into_iter()
        .filter(|i| seen.insert(i.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(population_size: usize, elitism: usize, selection_size: usize) -> BreedingParams {
        BreedingParams {
            population_size,
            elitism,
            selection_size,
            mutation_rate: 0.3,
            crossover_rate: 0.5,
            crossover_policy: CrossoverPolicy::Always,
            max_duplicate_retries: 1000,
        }
    }

    fn scored_ledger(rng: &mut GenomeRng, fitness: &[f32]) -> FitnessLedger {
        let space = GenotypeSpace::default();
        let mut ledger = FitnessLedger::new();
        for (id, f) in fitness.iter().enumerate() {
            let genotype = rng.random_genotype(&space);
            let individual = Individual::new(id as u64, 0, genotype, rng.rng());
            ledger.insert(*f, individual);
        }
        ledger
    }

    #[test]
    fn test_roulette_bounds_proportional() {
        let bounds = roulette_bounds(&[3.0, 2.0, 1.0]);
        assert!((bounds[0] - 0.5).abs() < 1e-6);
        assert!((bounds[1] - 5.0 / 6.0).abs() < 1e-6);
        assert!((bounds[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_roulette_bounds_zero_total_is_uniform() {
        let bounds = roulette_bounds(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(bounds, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_roulette_boundary_selects_owner() {
        let bounds = [0.5, 0.75, 1.0];
        assert_eq!(roulette_pick(&bounds, 0.0), 0);
        assert_eq!(roulette_pick(&bounds, 0.5), 0);
        assert_eq!(roulette_pick(&bounds, 0.500_01), 1);
        assert_eq!(roulette_pick(&bounds, 0.75), 1);
        assert_eq!(roulette_pick(&bounds, 0.99), 2);
        // rounding past the last bound
        assert_eq!(roulette_pick(&[0.5, 0.999_99], 1.0), 1);
    }

    #[test]
    fn test_selection_scenario() {
        // A, B, C, D scored 1, 2, 3, 3
        let mut rng = GenomeRng::new(42);
        let ledger = scored_ledger(&mut rng, &[1.0, 2.0, 3.0, 3.0]);
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.mean(), Some(2.25));

        let breeder = Breeder::new(params(4, 1, 2), GenotypeSpace::default());
        let selection = breeder.select(&ledger, &mut rng).unwrap();

        // D was scored after C, so it wins the tie
        let d = &ledger.by_rank(3).unwrap().individual;
        assert_eq!(d.id, 3);
        assert_eq!(selection.elites, vec![d.genotype.clone()]);
        assert_eq!(selection.parents[0].id, 3);
        assert!(!selection.parents.is_empty() && selection.parents.len() <= 2);
        assert!(selection.parents[1..].iter().all(|p| p.id != 3));

        let pool: Vec<f32> = ledger.below_top(1).map(|e| e.fitness).collect();
        assert_eq!(pool, vec![3.0, 2.0, 1.0]);
        let bounds = roulette_bounds(&pool);
        assert!((bounds[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_selection_without_roulette() {
        let mut rng = GenomeRng::new(1);
        let ledger = scored_ledger(&mut rng, &[5.0, 1.0, 4.0, 2.0, 3.0]);
        let breeder = Breeder::new(params(5, 2, 2), GenotypeSpace::default());

        let selection = breeder.select(&ledger, &mut rng).unwrap();
        let ids: Vec<u64> = selection.parents.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_selection_deduplicates() {
        // one dominant weight in the pool; every draw lands on it
        let mut rng = GenomeRng::new(3);
        let ledger = scored_ledger(&mut rng, &[0.0, 0.0, 10.0, 20.0]);
        let breeder = Breeder::new(params(4, 1, 4), GenotypeSpace::default());

        let selection = breeder.select(&ledger, &mut rng).unwrap();
        let ids: Vec<u64> = selection.parents.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_selection_zero_fitness_pool() {
        let mut rng = GenomeRng::new(3);
        let ledger = scored_ledger(&mut rng, &[0.0, 0.0, 0.0, 0.0]);
        let breeder = Breeder::new(params(4, 1, 3), GenotypeSpace::default());

        let selection = breeder.select(&ledger, &mut rng).unwrap();
        assert!(!selection.parents.is_empty());
        assert!(selection.parents.len() <= 3);
    }

    #[test]
    fn test_selection_rejects_incomplete_ledger() {
        let mut rng = GenomeRng::new(3);
        let ledger = scored_ledger(&mut rng, &[1.0, 2.0]);
        let breeder = Breeder::new(params(4, 1, 2), GenotypeSpace::default());

        assert!(matches!(
            breeder.select(&ledger, &mut rng),
            Err(EvolutionError::IncompleteLedger {
                expected: 4,
                found: 2
            })
        ));
    }

    #[test]
    fn test_crossover_output_size() {
        let mut rng = GenomeRng::new(5);
        let ledger = scored_ledger(&mut rng, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let breeder = Breeder::new(params(5, 0, 5), GenotypeSpace::default());

        for n in 0..=5 {
            let parents: Vec<Individual> =
                ledger.iter().take(n).map(|e| e.individual.clone()).collect();
            let offspring = breeder.crossover(parents, &mut rng);
            assert_eq!(offspring.len(), 2 * n.div_ceil(2));
        }
    }

    #[test]
    fn test_single_parent_self_crossover() {
        let mut rng = GenomeRng::new(5);
        let ledger = scored_ledger(&mut rng, &[1.0]);
        let breeder = Breeder::new(params(1, 0, 1), GenotypeSpace::default());

        let parent = ledger.best().unwrap().individual.clone();
        let offspring = breeder.crossover(vec![parent.clone()], &mut rng);
        assert_eq!(offspring, vec![parent.genotype.clone(), parent.genotype]);
    }

    #[test]
    fn test_probabilistic_crossover_never() {
        let mut rng = GenomeRng::new(8);
        let ledger = scored_ledger(&mut rng, &[1.0, 2.0]);
        let mut p = params(2, 0, 2);
        p.crossover_policy = CrossoverPolicy::Probabilistic;
        p.crossover_rate = 0.0;
        let breeder = Breeder::new(p, GenotypeSpace::default());

        let parents: Vec<Individual> = ledger.iter().map(|e| e.individual.clone()).collect();
        let offspring = breeder.crossover(parents.clone(), &mut rng);
        for parent in &parents {
            assert!(offspring.contains(&parent.genotype));
        }
    }

    #[test]
    fn test_mutation_without_mutants_is_unique() {
        let mut rng = GenomeRng::new(9);
        let space = GenotypeSpace::default();
        let offspring = rng.initial_population(6, &space);
        let mut p = params(5, 1, 4);
        p.mutation_rate = 0.0;
        let breeder = Breeder::new(p, space);

        let out = breeder.mutate(&offspring, &mut rng).unwrap();
        assert_eq!(out.len(), 4);
        for (i, g) in out.iter().enumerate() {
            assert!(offspring.contains(g));
            assert!(!out[i + 1..].contains(g));
        }
    }

    #[test]
    fn test_mutation_duplicate_cap_terminates() {
        let mut rng = GenomeRng::new(9);
        let space = GenotypeSpace::default();
        let offspring = rng.initial_population(1, &space);
        let mut p = params(4, 0, 1);
        p.mutation_rate = 0.0;
        p.max_duplicate_retries = 5;
        let breeder = Breeder::new(p, space);

        let out = breeder.mutate(&offspring, &mut rng).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|g| *g == offspring[0]));
    }

    #[test]
    fn test_mutation_empty_pool() {
        let mut rng = GenomeRng::new(9);
        let breeder = Breeder::new(params(4, 1, 2), GenotypeSpace::default());
        assert!(matches!(
            breeder.mutate(&[], &mut rng),
            Err(EvolutionError::EmptyBreedingPool)
        ));
    }

    #[test]
    fn test_breed_preserves_elites() {
        let mut rng = GenomeRng::new(21);
        let fitness = [0.4, 2.5, 1.1, 7.0, 3.3, 0.9, 6.2, 5.0];
        let ledger = scored_ledger(&mut rng, &fitness);
        let breeder = Breeder::new(params(8, 3, 5), GenotypeSpace::default());

        let next = breeder.breed(&ledger, &mut rng).unwrap();
        assert_eq!(next.len(), 8);
        let best: Vec<Genotype> = ledger
            .top(3)
            .map(|e| e.individual.genotype.clone())
            .collect();
        assert_eq!(&next[..3], &best[..]);
    }

    proptest! {
        #[test]
        fn prop_breed_population_size(
            seed in any::<u64>(),
            fitness in prop::collection::vec(0.0f32..50.0, 2..24),
            elitism_frac in 0.0f64..1.0,
            mutation_rate in 0.0f32..=1.0,
        ) {
            let n = fitness.len();
            let elitism = ((n - 1) as f64 * elitism_frac) as usize;
            let selection_size = elitism.max(1) + (seed as usize % n);

            let mut rng = GenomeRng::new(seed);
            let ledger = scored_ledger(&mut rng, &fitness);
            let mut p = params(n, elitism, selection_size);
            p.mutation_rate = mutation_rate;
            p.max_duplicate_retries = 50;
            let breeder = Breeder::new(p, GenotypeSpace::default());

            let next = breeder.breed(&ledger, &mut rng).unwrap();
            prop_assert_eq!(next.len(), n);
            for (g, entry) in next.iter().zip(ledger.top(elitism)) {
                prop_assert_eq!(g, &entry.individual.genotype);
            }
        }
    }
}
