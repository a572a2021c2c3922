//! Selection operators
//!
//! Both operators work on minimization fitness: lower values are picked
//! more often.

use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::error::OperatorError;
use crate::fitness::traits::fitness_key;
use crate::operators::traits::SelectionOperator;

/// Default weight floor for roulette selection
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Roulette wheel selection (fitness proportionate, minimizing)
///
/// Each individual gets weight `(f_max - f) + epsilon`, where `f_max` is the
/// worst finite fitness in the population. The floor keeps the worst
/// individual selectable and turns an all-equal population into uniform
/// sampling. Non-finite fitness values get the floor weight only.
#[derive(Clone, Debug)]
pub struct RouletteSelection {
    epsilon: f64,
}

impl RouletteSelection {
    /// Create a new roulette selection
    pub fn new() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Create with a custom weight floor
    pub fn with_epsilon(epsilon: f64) -> Result<Self, OperatorError> {
        if epsilon > 0.0 && epsilon.is_finite() {
            Ok(Self { epsilon })
        } else {
            Err(OperatorError::InvalidConfiguration(format!(
                "roulette epsilon must be positive and finite, got {epsilon}"
            )))
        }
    }

    /// The weight floor
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Selection weight of every individual
    pub fn weights(&self, fitnesses: &[f64]) -> Vec<f64> {
        let f_max = fitnesses
            .iter()
            .copied()
            .filter(|f| f.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);

        fitnesses
            .iter()
            .map(|&f| {
                if f.is_finite() {
                    (f_max - f) + self.epsilon
                } else {
                    self.epsilon
                }
            })
            .collect()
    }

    fn distribution(&self, fitnesses: &[f64]) -> Option<WeightedIndex<f64>> {
        WeightedIndex::new(self.weights(fitnesses)).ok()
    }
}

impl Default for RouletteSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionOperator for RouletteSelection {
    fn select<R: Rng>(&self, fitnesses: &[f64], rng: &mut R) -> usize {
        assert!(!fitnesses.is_empty(), "Population cannot be empty");

        match self.distribution(fitnesses) {
            Some(dist) => dist.sample(rng),
            None => rng.gen_range(0..fitnesses.len()),
        }
    }

    fn select_many<R: Rng>(&self, fitnesses: &[f64], count: usize, rng: &mut R) -> Vec<usize> {
        assert!(!fitnesses.is_empty(), "Population cannot be empty");

        // Weights overflowing to infinity degrade to uniform sampling
        match self.distribution(fitnesses) {
            Some(dist) => (0..count).map(|_| dist.sample(rng)).collect(),
            None => (0..count)
                .map(|_| rng.gen_range(0..fitnesses.len()))
                .collect(),
        }
    }
}

/// Tournament selection operator
///
/// Draws `tournament_size` distinct individuals and keeps the one with the
/// lowest fitness.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Result<Self, OperatorError> {
        if tournament_size == 0 {
            return Err(OperatorError::InvalidConfiguration(
                "tournament size must be at least 1".to_string(),
            ));
        }
        Ok(Self { tournament_size })
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self { tournament_size: 2 }
    }

    /// Number of contenders per tournament
    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }
}

impl SelectionOperator for TournamentSelection {
    fn select<R: Rng>(&self, fitnesses: &[f64], rng: &mut R) -> usize {
        assert!(!fitnesses.is_empty(), "Population cannot be empty");

        let size = self.tournament_size.min(fitnesses.len());
        let rank = |i: usize| fitness_key(Some(fitnesses[i]));

        let mut contenders = index::sample(rng, fitnesses.len(), size).into_iter();
        let first = contenders.next().unwrap_or(0);
        contenders.fold(first, |best, i| if rank(i) < rank(best) { i } else { best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn frequencies<S: SelectionOperator>(selection: &S, fitnesses: &[f64], draws: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = vec![0usize; fitnesses.len()];
        for index in selection.select_many(fitnesses, draws, &mut rng) {
            counts[index] += 1;
        }
        counts.iter().map(|&c| c as f64 / draws as f64).collect()
    }

    #[test]
    fn test_roulette_weights() {
        let selection = RouletteSelection::new();
        let weights = selection.weights(&[1.0, 2.0, 3.0]);
        assert!((weights[0] - 2.0).abs() < 1e-6);
        assert!((weights[1] - 1.0).abs() < 1e-6);
        assert_eq!(weights[2], DEFAULT_EPSILON);
    }

    #[test]
    fn test_roulette_prefers_lower_fitness() {
        let freq = frequencies(&RouletteSelection::new(), &[1.0, 2.0, 3.0], 30_000);

        assert!(freq[0] > freq[1]);
        assert!(freq[1] > freq[2]);
        assert!((freq[0] - 2.0 / 3.0).abs() < 0.02);
        assert!((freq[1] - 1.0 / 3.0).abs() < 0.02);
    }

    #[test]
    fn test_roulette_all_equal_is_uniform() {
        let freq = frequencies(&RouletteSelection::new(), &[5.0; 4], 40_000);
        for f in freq {
            assert!((f - 0.25).abs() < 0.02, "frequency {f} not near 0.25");
        }
    }

    #[test]
    fn test_roulette_handles_negative_fitness() {
        let freq = frequencies(&RouletteSelection::new(), &[-10.0, -5.0, 0.0], 10_000);
        assert!(freq[0] > freq[1]);
        assert!(freq[1] > freq[2]);
    }

    #[test]
    fn test_roulette_non_finite_gets_floor_weight() {
        let selection = RouletteSelection::new();
        let weights = selection.weights(&[1.0, f64::NAN, 2.0, f64::INFINITY]);
        assert_eq!(weights[1], DEFAULT_EPSILON);
        assert_eq!(weights[3], DEFAULT_EPSILON);
        assert!(weights[0] > weights[2]);

        let mut rng = StdRng::seed_from_u64(5);
        let picks = selection.select_many(&[f64::NAN, f64::NAN], 100, &mut rng);
        assert!(picks.iter().all(|&i| i < 2));
    }

    #[test]
    fn test_roulette_single_select_valid_index() {
        let mut rng = StdRng::seed_from_u64(5);
        let selection = RouletteSelection::new();
        for _ in 0..100 {
            assert!(selection.select(&[3.0, 1.0, 2.0], &mut rng) < 3);
        }
    }

    #[test]
    fn test_roulette_epsilon_validation() {
        assert_eq!(RouletteSelection::with_epsilon(0.5).unwrap().epsilon(), 0.5);
        assert!(RouletteSelection::with_epsilon(0.0).is_err());
        assert!(RouletteSelection::with_epsilon(-1.0).is_err());
        assert!(RouletteSelection::with_epsilon(f64::NAN).is_err());
    }

    #[test]
    fn test_tournament_full_size_picks_best() {
        let mut rng = StdRng::seed_from_u64(9);
        let selection = TournamentSelection::new(3).unwrap();
        for _ in 0..100 {
            assert_eq!(selection.select(&[4.0, -2.0, 7.0], &mut rng), 1);
        }
    }

    #[test]
    fn test_tournament_prefers_lower_fitness() {
        let freq = frequencies(&TournamentSelection::binary(), &[1.0, 2.0, 3.0], 10_000);
        assert!(freq[0] > freq[2]);
    }

    #[test]
    fn test_tournament_nan_loses() {
        let mut rng = StdRng::seed_from_u64(9);
        let selection = TournamentSelection::new(2).unwrap();
        for _ in 0..50 {
            assert_eq!(selection.select(&[f64::NAN, 100.0], &mut rng), 1);
        }
    }

    #[test]
    fn test_tournament_size_validation() {
        assert!(TournamentSelection::new(0).is_err());
        assert_eq!(TournamentSelection::binary().tournament_size(), 2);
    }
}
