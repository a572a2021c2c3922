//! Operator traits
//!
//! This module defines the capability traits the generational loop is
//! written against. The driver never names a concrete operator.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::population::individual::Individual;
use crate::population::population::FitnessSummary;

/// Selection operator trait
///
/// Picks parents from a population given its fitness values (lower is better).
pub trait SelectionOperator: Send + Sync {
    /// Select a single individual
    ///
    /// Returns the index of the selected individual.
    ///
    /// # Panics
    /// Implementations may panic if `fitnesses` is empty.
    fn select<R: Rng>(&self, fitnesses: &[f64], rng: &mut R) -> usize;

    /// Select `count` individuals independently, with replacement
    fn select_many<R: Rng>(&self, fitnesses: &[f64], count: usize, rng: &mut R) -> Vec<usize> {
        (0..count).map(|_| self.select(fitnesses, rng)).collect()
    }
}

/// Crossover operator trait
///
/// Combines two parents into two offspring.
pub trait CrossoverOperator: Send + Sync {
    /// Recombine two parents
    ///
    /// Both offspring must lie within the parents' bounds.
    fn crossover<R: Rng>(
        &self,
        parent1: &Individual,
        parent2: &Individual,
        rng: &mut R,
    ) -> (Individual, Individual);

    /// Probability of applying crossover to this pair
    ///
    /// `summary` describes the whole current population, so rates may adapt
    /// to how the pair compares with it.
    fn crossover_probability(
        &self,
        _parent1: &Individual,
        _parent2: &Individual,
        _summary: &FitnessSummary,
    ) -> f64 {
        1.0
    }
}

/// Mutation operator trait
///
/// Perturbs an offspring in place. Never evaluates it.
pub trait MutationOperator: Send + Sync {
    /// Apply mutation to an individual
    fn mutate<R: Rng>(&self, individual: &mut Individual, progress: Progress, rng: &mut R);

    /// Get the mutation probability per gene
    fn mutation_probability(&self) -> f64 {
        1.0
    }
}

/// How far a run has advanced
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Current generation (0-based)
    pub generation: usize,
    /// Generation budget of the run
    pub max_generations: usize,
}

impl Progress {
    /// Create a progress marker
    pub fn new(generation: usize, max_generations: usize) -> Self {
        Self {
            generation,
            max_generations,
        }
    }

    /// Fraction of the budget used, in `[0, 1]`
    ///
    /// A zero budget counts as finished.
    pub fn fraction(&self) -> f64 {
        if self.max_generations == 0 {
            return 1.0;
        }
        (self.generation as f64 / self.max_generations as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::genome::bounds::MultiBounds;

    // Picks uniformly, ignoring fitness
    struct MockSelection;

    impl SelectionOperator for MockSelection {
        fn select<R: Rng>(&self, fitnesses: &[f64], rng: &mut R) -> usize {
            rng.gen_range(0..fitnesses.len())
        }
    }

    // Swaps the parents
    struct MockCrossover;

    impl CrossoverOperator for MockCrossover {
        fn crossover<R: Rng>(
            &self,
            parent1: &Individual,
            parent2: &Individual,
            _rng: &mut R,
        ) -> (Individual, Individual) {
            (parent2.clone(), parent1.clone())
        }
    }

    // Pushes every gene up by a fixed step
    struct MockMutation;

    impl MutationOperator for MockMutation {
        fn mutate<R: Rng>(&self, individual: &mut Individual, _progress: Progress, _rng: &mut R) {
            for i in 0..individual.dimension() {
                let value = individual.genes()[i] + 1.0;
                individual.set_gene(i, value);
            }
        }
    }

    fn individual(genes: Vec<f64>) -> Individual {
        let bounds = Arc::new(MultiBounds::symmetric(2.0, genes.len()).unwrap());
        Individual::from_genes(genes, bounds).unwrap()
    }

    #[test]
    fn test_default_select_many() {
        let mut rng = StdRng::seed_from_u64(3);
        let picks = MockSelection.select_many(&[1.0, 2.0, 3.0], 50, &mut rng);
        assert_eq!(picks.len(), 50);
        assert!(picks.iter().all(|&i| i < 3));
    }

    #[test]
    fn test_default_crossover_probability() {
        let a = individual(vec![0.0]);
        let b = individual(vec![1.0]);
        let summary = FitnessSummary::from_values(&[1.0, 2.0]).unwrap();
        assert_eq!(MockCrossover.crossover_probability(&a, &b, &summary), 1.0);

        let mut rng = StdRng::seed_from_u64(3);
        let (c1, c2) = MockCrossover.crossover(&a, &b, &mut rng);
        assert_eq!(c1.genes(), &[1.0]);
        assert_eq!(c2.genes(), &[0.0]);
    }

    #[test]
    fn test_mock_mutation_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ind = individual(vec![0.5, 1.5]);
        MockMutation.mutate(&mut ind, Progress::new(0, 10), &mut rng);
        assert_eq!(ind.genes(), &[1.5, 2.0]);
        assert_eq!(MockMutation.mutation_probability(), 1.0);
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(Progress::new(0, 10).fraction(), 0.0);
        assert_eq!(Progress::new(5, 10).fraction(), 0.5);
        assert_eq!(Progress::new(12, 10).fraction(), 1.0);
        assert_eq!(Progress::new(0, 0).fraction(), 1.0);
    }
}
