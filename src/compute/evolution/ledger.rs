//! Fitness ledger: scored individuals ordered by fitness.
//!
//! Entries are kept ascending by fitness. Equal fitness values are all
//! retained; a later insert is placed after existing equal keys, so among
//! ties the most recently scored individual ranks highest.

use serde::{Deserialize, Serialize};

use super::population::Individual;

/// One scored individual.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub fitness: f32,
    pub individual: Individual,
}

/// Aggregate statistics over a ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerStats {
    pub count: usize,
    pub mean: f32,
    pub min: f32,
    pub max: f32,
    pub std: f32,
}

/// Ordered multi-map from fitness to the individual that achieved it.
///
/// Rank 0 is the worst (smallest fitness), rank `len - 1` the best.
#[derive(Debug, Clone, Default)]
pub struct FitnessLedger {
    entries: Vec<LedgerEntry>,
}

impl FitnessLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a scored individual and return its rank.
    ///
    /// The fitness must not be NaN; callers validate trial output first.
    pub fn insert(&mut self, fitness: f32, individual: Individual) -> usize {
        debug_assert!(!fitness.is_nan(), "NaN fitness in ledger");
        let rank = self.entries.partition_point(|e| e.fitness <= fitness);
        self.entries.insert(
            rank,
            LedgerEntry {
                fitness,
                individual,
            },
        );
        rank
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in ascending fitness order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LedgerEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Entries from best to worst.
    pub fn iter_best_first(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().rev()
    }

    /// Entry at an ascending rank (0 = worst).
    pub fn by_rank(&self, rank: usize) -> Option<&LedgerEntry> {
        self.entries.get(rank)
    }

    pub fn best(&self) -> Option<&LedgerEntry> {
        self.entries.last()
    }

    pub fn worst(&self) -> Option<&LedgerEntry> {
        self.entries.first()
    }

    /// The `n` best entries, best first.
    pub fn top(&self, n: usize) -> impl Iterator<Item = &LedgerEntry> {
        self.iter_best_first().take(n)
    }

    /// Entries below the top `n`, best first.
    pub fn below_top(&self, n: usize) -> impl Iterator<Item = &LedgerEntry> {
        self.iter_best_first().skip(n)
    }

    /// Mean fitness, `None` when empty.
    pub fn mean(&self) -> Option<f32> {
        if self.entries.is_empty() {
            return None;
        }
        let sum: f32 = self.entries.iter().map(|e| e.fitness).sum();
        Some(sum / self.entries.len() as f32)
    }

    /// Count, mean, extremes and standard deviation; `None` when empty.
    pub fn stats(&self) -> Option<LedgerStats> {
        let mean = self.mean()?;
        let count = self.entries.len();
        let variance: f32 = self
            .entries
            .iter()
            .map(|e| (e.fitness - mean).powi(2))
            .sum::<f32>()
            / count as f32;

        Some(LedgerStats {
            count,
            mean,
            min: self.entries[0].fitness,
            max: self.entries[count - 1].fitness,
            std: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::evolution::genome::{GenomeRng, GenotypeSpace};
    use proptest::prelude::*;

    fn individual(rng: &mut GenomeRng, id: u64) -> Individual {
        let genotype = rng.random_genotype(&GenotypeSpace::default());
        Individual::new(id, 0, genotype, rng.rng())
    }

    #[test]
    fn test_ascending_order() {
        let mut rng = GenomeRng::new(42);
        let mut ledger = FitnessLedger::new();
        for (id, f) in [3.0, 1.0, 2.0].into_iter().enumerate() {
            ledger.insert(f, individual(&mut rng, id as u64));
        }

        let keys: Vec<f32> = ledger.iter().map(|e| e.fitness).collect();
        assert_eq!(keys, vec![1.0, 2.0, 3.0]);
        assert_eq!(ledger.worst().unwrap().fitness, 1.0);
        assert_eq!(ledger.best().unwrap().fitness, 3.0);
        assert_eq!(ledger.by_rank(1).unwrap().individual.id, 2);
    }

    #[test]
    fn test_duplicate_keys_retained() {
        let mut rng = GenomeRng::new(42);
        let mut ledger = FitnessLedger::new();
        ledger.insert(3.0, individual(&mut rng, 0));
        ledger.insert(3.0, individual(&mut rng, 1));

        assert_eq!(ledger.len(), 2);
        let ids: Vec<u64> = ledger.iter().map(|e| e.individual.id).collect();
        // later insert ranks higher among ties
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(ledger.best().unwrap().individual.id, 1);
    }

    #[test]
    fn test_mean_and_stats() {
        let mut rng = GenomeRng::new(42);
        let mut ledger = FitnessLedger::new();
        assert_eq!(ledger.mean(), None);
        assert!(ledger.stats().is_none());

        for (id, f) in [1.0, 2.0, 3.0, 3.0].into_iter().enumerate() {
            ledger.insert(f, individual(&mut rng, id as u64));
        }
        assert_eq!(ledger.mean(), Some(2.25));

        let stats = ledger.stats().unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert!((stats.std - 0.829_156).abs() < 1e-4);
    }

    #[test]
    fn test_top_and_below_top() {
        let mut rng = GenomeRng::new(42);
        let mut ledger = FitnessLedger::new();
        for (id, f) in [1.0, 4.0, 2.0, 3.0].into_iter().enumerate() {
            ledger.insert(f, individual(&mut rng, id as u64));
        }

        let top: Vec<f32> = ledger.top(2).map(|e| e.fitness).collect();
        assert_eq!(top, vec![4.0, 3.0]);
        let rest: Vec<f32> = ledger.below_top(2).map(|e| e.fitness).collect();
        assert_eq!(rest, vec![2.0, 1.0]);
    }

    #[test]
    fn test_clear() {
        let mut rng = GenomeRng::new(42);
        let mut ledger = FitnessLedger::new();
        ledger.insert(1.0, individual(&mut rng, 0));
        ledger.clear();
        assert!(ledger.is_empty());
    }

    proptest! {
        #[test]
        fn prop_size_and_order(values in prop::collection::vec(0.0f32..100.0, 0..40)) {
            let mut rng = GenomeRng::new(9);
            let mut ledger = FitnessLedger::new();
            for (id, f) in values.iter().enumerate() {
                ledger.insert(*f, individual(&mut rng, id as u64));
            }

            prop_assert_eq!(ledger.len(), values.len());
            let keys: Vec<f32> = ledger.iter().map(|e| e.fitness).collect();
            prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
