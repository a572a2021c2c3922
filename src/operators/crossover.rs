//! Crossover operators
//!
//! Arithmetic (blend) crossover with a constant or fitness-adaptive rate,
//! plus the pairing rule that turns a selected parent pool into offspring.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::OperatorError;
use crate::fitness::traits::fitness_key;
use crate::operators::traits::CrossoverOperator;
use crate::population::individual::Individual;
use crate::population::population::FitnessSummary;

/// Probability of applying crossover to a pair
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverRate {
    /// The same probability for every pair
    Constant(f64),
    /// A probability in `[low, high]` chosen from the pair's fitness
    ///
    /// Pairs worse than the population mean always use `high`.
    Adaptive {
        /// Lower end of the range
        low: f64,
        /// Upper end of the range
        high: f64,
    },
}

impl CrossoverRate {
    /// Create a constant rate
    pub fn constant(probability: f64) -> Result<Self, OperatorError> {
        let rate = Self::Constant(probability);
        rate.validate()?;
        Ok(rate)
    }

    /// Create an adaptive rate over `[low, high]`
    pub fn adaptive(low: f64, high: f64) -> Result<Self, OperatorError> {
        let rate = Self::Adaptive { low, high };
        rate.validate()?;
        Ok(rate)
    }

    /// Check that every probability lies in `[0, 1]` and `low <= high`
    pub fn validate(&self) -> Result<(), OperatorError> {
        match *self {
            Self::Constant(p) => {
                OperatorError::check_probability("crossover probability", p)?;
            }
            Self::Adaptive { low, high } => {
                OperatorError::check_probability("crossover low probability", low)?;
                OperatorError::check_probability("crossover high probability", high)?;
                if low > high {
                    return Err(OperatorError::InvalidConfiguration(format!(
                        "crossover low probability {low} exceeds high probability {high}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Crossover probability for a pair whose better parent has fitness `best`
    ///
    /// For adaptive rates with `best <= mean`:
    /// `high - (high - low) * (max - best) / (max - mean)`, falling back to
    /// `high` when `max == mean`. The result is always within `[low, high]`.
    ///
    /// Since `max - best >= max - mean` whenever `best <= mean`, the clamp
    /// makes this `low` for pairs at or better than the population mean and
    /// `high` for every other pair.
    pub fn probability(&self, best: f64, summary: &FitnessSummary) -> f64 {
        match *self {
            Self::Constant(p) => p,
            Self::Adaptive { low, high } => {
                if best > summary.mean {
                    return high;
                }
                let spread = summary.max - summary.mean;
                if !(spread > 0.0 && spread.is_finite()) {
                    return high;
                }
                let p = high - (high - low) * (summary.max - best) / spread;
                p.max(low).min(high)
            }
        }
    }
}

impl Default for CrossoverRate {
    fn default() -> Self {
        Self::Constant(0.9)
    }
}

/// How the blend factor α is chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendFactor {
    /// α drawn uniformly from `[0, 1)` once per pair
    #[default]
    PerPair,
    /// The same α for every pair
    Fixed(f64),
}

impl BlendFactor {
    /// Create a fixed blend factor
    pub fn fixed(alpha: f64) -> Result<Self, OperatorError> {
        let blend = Self::Fixed(alpha);
        blend.validate()?;
        Ok(blend)
    }

    /// Check that a fixed α lies in `[0, 1]`
    pub fn validate(&self) -> Result<(), OperatorError> {
        if let Self::Fixed(alpha) = *self {
            OperatorError::check_probability("blend factor", alpha)?;
        }
        Ok(())
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::PerPair => rng.gen(),
            Self::Fixed(alpha) => alpha,
        }
    }
}

/// Arithmetic crossover
///
/// `child1 = α·A + (1-α)·B` and `child2 = (1-α)·A + α·B`, both clamped.
#[derive(Clone, Debug, Default)]
pub struct ArithmeticCrossover {
    rate: CrossoverRate,
    blend: BlendFactor,
}

impl ArithmeticCrossover {
    /// Create an arithmetic crossover
    pub fn new(rate: CrossoverRate, blend: BlendFactor) -> Result<Self, OperatorError> {
        rate.validate()?;
        blend.validate()?;
        Ok(Self { rate, blend })
    }

    /// Constant rate, α drawn per pair
    pub fn constant(probability: f64) -> Result<Self, OperatorError> {
        Self::new(CrossoverRate::constant(probability)?, BlendFactor::PerPair)
    }

    /// Adaptive rate over `[low, high]`, α drawn per pair
    pub fn adaptive(low: f64, high: f64) -> Result<Self, OperatorError> {
        Self::new(CrossoverRate::adaptive(low, high)?, BlendFactor::PerPair)
    }

    /// The configured rate
    pub fn rate(&self) -> CrossoverRate {
        self.rate
    }

    /// The configured blend factor
    pub fn blend(&self) -> BlendFactor {
        self.blend
    }
}

impl CrossoverOperator for ArithmeticCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Individual,
        parent2: &Individual,
        rng: &mut R,
    ) -> (Individual, Individual) {
        let alpha = self.blend.draw(rng);

        let (genes1, genes2): (Vec<f64>, Vec<f64>) = parent1
            .genes()
            .iter()
            .zip(parent2.genes())
            .map(|(&a, &b)| (alpha * a + (1.0 - alpha) * b, (1.0 - alpha) * a + alpha * b))
            .unzip();

        (parent1.offspring(genes1), parent1.offspring(genes2))
    }

    fn crossover_probability(
        &self,
        parent1: &Individual,
        parent2: &Individual,
        summary: &FitnessSummary,
    ) -> f64 {
        let best = fitness_key(parent1.fitness()).min(fitness_key(parent2.fitness()));
        self.rate.probability(best, summary)
    }
}

/// Recombine a parent pool pair by pair
///
/// Pairs are consecutive entries `(0, 1), (2, 3), ...`. With an odd count
/// the last parent pairs with the first and only the first child of that
/// pair is kept, so the result has exactly `parents.len()` entries. Pairs
/// that skip crossover pass through unchanged, fitness included.
pub fn pairwise_crossover<C, R>(
    operator: &C,
    parents: &[Individual],
    summary: &FitnessSummary,
    rng: &mut R,
) -> Vec<Individual>
where
    C: CrossoverOperator,
    R: Rng,
{
    let n = parents.len();
    let mut offspring = Vec::with_capacity(n);

    let mut i = 0;
    while offspring.len() < n {
        let a = &parents[i % n];
        let b = &parents[(i + 1) % n];

        let probability = operator.crossover_probability(a, b, summary);
        let (child1, child2) = if rng.gen::<f64>() < probability {
            operator.crossover(a, b, rng)
        } else {
            (a.clone(), b.clone())
        };

        offspring.push(child1);
        if offspring.len() < n {
            offspring.push(child2);
        }
        i += 2;
    }

    offspring
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::genome::bounds::MultiBounds;

    fn parents(values: &[f64]) -> Vec<Individual> {
        let bounds = Arc::new(MultiBounds::symmetric(10.0, 1).unwrap());
        values
            .iter()
            .map(|&x| {
                let mut ind = Individual::from_genes(vec![x], Arc::clone(&bounds)).unwrap();
                ind.evaluate(&|g: &[f64]| g[0]);
                ind
            })
            .collect()
    }

    fn summary(values: &[f64]) -> FitnessSummary {
        FitnessSummary::from_values(values).unwrap()
    }

    #[test]
    fn test_constant_rate() {
        let rate = CrossoverRate::constant(0.7).unwrap();
        assert_eq!(rate.probability(-100.0, &summary(&[1.0, 2.0])), 0.7);
        assert_eq!(rate.probability(100.0, &summary(&[1.0, 2.0])), 0.7);
    }

    #[test]
    fn test_rate_validation() {
        assert!(CrossoverRate::constant(1.5).is_err());
        assert!(CrossoverRate::constant(-0.1).is_err());
        assert!(CrossoverRate::adaptive(0.8, 0.2).is_err());
        assert!(CrossoverRate::adaptive(0.0, 1.1).is_err());
        assert!(CrossoverRate::adaptive(0.3, 0.3).is_ok());
        assert!(BlendFactor::fixed(1.2).is_err());
        assert!(ArithmeticCrossover::new(CrossoverRate::Constant(2.0), BlendFactor::PerPair).is_err());
    }

    #[test]
    fn test_adaptive_worse_than_average_uses_high() {
        let rate = CrossoverRate::adaptive(0.5, 0.9).unwrap();
        let s = summary(&[1.0, 2.0, 3.0, 10.0]);
        assert_eq!(rate.probability(8.0, &s), 0.9);
    }

    #[test]
    fn test_adaptive_better_than_average_uses_low() {
        let rate = CrossoverRate::adaptive(0.5, 0.9).unwrap();
        let s = summary(&[0.0, 1.0, 2.0, 9.0]);
        for best in [-5.0, 0.0, 1.0, 2.0] {
            assert_eq!(rate.probability(best, &s), 0.5);
        }
        assert!((rate.probability(s.mean, &s) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_adaptive_degenerate_spread_uses_high() {
        let rate = CrossoverRate::adaptive(0.5, 0.9).unwrap();
        let s = summary(&[4.0, 4.0, 4.0]);
        assert_eq!(rate.probability(4.0, &s), 0.9);
    }

    #[test]
    fn test_adaptive_stays_in_range() {
        let rate = CrossoverRate::adaptive(0.5, 0.9).unwrap();
        let s = summary(&[0.0, 1.0, 2.0, 9.0]);
        for best in [-1e9, 0.0, 0.5, 2.0, 3.0, 9.0, f64::INFINITY, f64::NAN] {
            let p = rate.probability(best, &s);
            assert!((0.5..=0.9).contains(&p), "p = {p} for best = {best}");
        }
    }

    #[test]
    fn test_rate_serde() {
        let rate = CrossoverRate::adaptive(0.5, 0.9).unwrap();
        let json = serde_json::to_string(&rate).unwrap();
        assert_eq!(json, r#"{"adaptive":{"low":0.5,"high":0.9}}"#);
        let back: CrossoverRate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rate);

        let constant: CrossoverRate = serde_json::from_str(r#"{"constant":0.8}"#).unwrap();
        assert_eq!(constant, CrossoverRate::Constant(0.8));
    }

    #[test]
    fn test_arithmetic_children_are_blends() {
        let mut rng = StdRng::seed_from_u64(17);
        let bounds = Arc::new(MultiBounds::symmetric(10.0, 3).unwrap());
        let a = Individual::from_genes(vec![-4.0, 0.0, 6.0], Arc::clone(&bounds)).unwrap();
        let b = Individual::from_genes(vec![2.0, 5.0, 6.0], bounds).unwrap();
        let crossover = ArithmeticCrossover::default();

        for _ in 0..100 {
            let (c1, c2) = crossover.crossover(&a, &b, &mut rng);
            assert!(!c1.is_evaluated());
            for i in 0..3 {
                let (lo, hi) = (a.genes()[i].min(b.genes()[i]), a.genes()[i].max(b.genes()[i]));
                for child in [&c1, &c2] {
                    assert!(child.genes()[i] >= lo - 1e-9 && child.genes()[i] <= hi + 1e-9);
                }
                let sum = c1.genes()[i] + c2.genes()[i];
                assert!((sum - (a.genes()[i] + b.genes()[i])).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_fixed_blend() {
        let mut rng = StdRng::seed_from_u64(17);
        let pool = parents(&[0.0, 8.0]);
        let crossover =
            ArithmeticCrossover::new(CrossoverRate::Constant(1.0), BlendFactor::fixed(0.25).unwrap())
                .unwrap();
        let (c1, c2) = crossover.crossover(&pool[0], &pool[1], &mut rng);
        assert_eq!(c1.genes(), &[6.0]);
        assert_eq!(c2.genes(), &[2.0]);
    }

    #[test]
    fn test_pairing_zero_rate_passes_parents_through() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = parents(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let crossover = ArithmeticCrossover::constant(0.0).unwrap();

        let offspring = pairwise_crossover(&crossover, &pool, &summary(&[0.0, 4.0]), &mut rng);
        let genes: Vec<f64> = offspring.iter().map(|i| i.genes()[0]).collect();
        assert_eq!(genes, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(offspring.iter().all(Individual::is_evaluated));
    }

    #[test]
    fn test_pairing_odd_count_wraps_around() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = parents(&[0.0, 2.0, 6.0]);
        let crossover =
            ArithmeticCrossover::new(CrossoverRate::Constant(1.0), BlendFactor::Fixed(0.5)).unwrap();

        let offspring = pairwise_crossover(&crossover, &pool, &summary(&[0.0, 6.0]), &mut rng);
        let genes: Vec<f64> = offspring.iter().map(|i| i.genes()[0]).collect();
        // (0, 2) -> 1, 1 and the wrap-around pair (6, 0) -> 3
        assert_eq!(genes, vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_pairing_even_count_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = parents(&[0.0, 1.0, 2.0, 3.0]);
        let crossover = ArithmeticCrossover::adaptive(0.2, 0.9).unwrap();
        let offspring = pairwise_crossover(&crossover, &pool, &summary(&[0.0, 3.0]), &mut rng);
        assert_eq!(offspring.len(), 4);
    }
}
