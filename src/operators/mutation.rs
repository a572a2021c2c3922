//! Mutation operators
//!
//! Every operator visits each gene independently, perturbs it with the
//! configured per-gene probability, and clamps the result into bounds.

use std::sync::Arc;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::OperatorError;
use crate::genome::bounds::Bounds;
use crate::operators::traits::{MutationOperator, Progress};
use crate::population::individual::Individual;

/// Default shape exponent of [`NonUniformMutation`]
pub const DEFAULT_SHAPE: f64 = 3.0;

/// Visit each gene with probability `probability` and replace it by `perturb`
fn mutate_genes<R, F>(individual: &mut Individual, probability: f64, rng: &mut R, mut perturb: F)
where
    R: Rng,
    F: FnMut(f64, &Bounds, &mut R) -> f64,
{
    let bounds = Arc::clone(individual.bounds());
    for (i, bound) in bounds.iter().enumerate() {
        if rng.gen::<f64>() < probability {
            let value = perturb(individual.genes()[i], bound, rng);
            individual.set_gene(i, value);
        }
    }
}

/// Uniform mutation
///
/// Replaces a gene with a fresh uniform draw from its bounds.
#[derive(Clone, Debug)]
pub struct UniformMutation {
    probability: f64,
}

impl UniformMutation {
    /// Create a uniform mutation with the given per-gene probability
    pub fn new(probability: f64) -> Result<Self, OperatorError> {
        Ok(Self {
            probability: OperatorError::check_probability("mutation probability", probability)?,
        })
    }
}

impl MutationOperator for UniformMutation {
    fn mutate<R: Rng>(&self, individual: &mut Individual, _progress: Progress, rng: &mut R) {
        mutate_genes(individual, self.probability, rng, |current, bound, rng| {
            if bound.is_degenerate() {
                current
            } else {
                rng.gen_range(bound.min..=bound.max)
            }
        });
    }

    fn mutation_probability(&self) -> f64 {
        self.probability
    }
}

/// Gaussian mutation
///
/// Adds `N(0, (sigma * range)^2)` noise to a gene, where `range` is the
/// width of its bounds.
#[derive(Clone, Debug)]
pub struct GaussianMutation {
    probability: f64,
    sigma: f64,
}

impl GaussianMutation {
    /// Create a gaussian mutation
    ///
    /// `sigma` is relative to each dimension's range.
    pub fn new(probability: f64, sigma: f64) -> Result<Self, OperatorError> {
        let probability = OperatorError::check_probability("mutation probability", probability)?;
        if !(sigma >= 0.0 && sigma.is_finite()) {
            return Err(OperatorError::InvalidConfiguration(format!(
                "gaussian sigma must be non-negative and finite, got {sigma}"
            )));
        }
        Ok(Self { probability, sigma })
    }

    /// Relative standard deviation
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl MutationOperator for GaussianMutation {
    fn mutate<R: Rng>(&self, individual: &mut Individual, _progress: Progress, rng: &mut R) {
        let sigma = self.sigma;
        mutate_genes(individual, self.probability, rng, |current, bound, rng| {
            let noise: f64 = StandardNormal.sample(rng);
            current + noise * sigma * bound.range()
        });
    }

    fn mutation_probability(&self) -> f64 {
        self.probability
    }
}

/// Non-uniform (annealed) mutation
///
/// Moves a gene towards its lower or upper bound with equal chance, by a
/// fraction `1 - u^((1 - t/T)^shape)` of the remaining distance, where `u`
/// is uniform and `t/T` the run's progress. Early steps are large and shrink
/// to zero by the end of the budget.
#[derive(Clone, Debug)]
pub struct NonUniformMutation {
    probability: f64,
    shape: f64,
}

impl NonUniformMutation {
    /// Create a non-uniform mutation with the default shape
    pub fn new(probability: f64) -> Result<Self, OperatorError> {
        Ok(Self {
            probability: OperatorError::check_probability("mutation probability", probability)?,
            shape: DEFAULT_SHAPE,
        })
    }

    /// Set the shape exponent (larger anneals faster)
    pub fn with_shape(mut self, shape: f64) -> Result<Self, OperatorError> {
        if !(shape >= 0.0 && shape.is_finite()) {
            return Err(OperatorError::InvalidConfiguration(format!(
                "non-uniform shape must be non-negative and finite, got {shape}"
            )));
        }
        self.shape = shape;
        Ok(self)
    }

    /// Shape exponent
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Fraction of the distance to a bound covered at this point of the run
    fn magnitude<R: Rng>(&self, progress: Progress, rng: &mut R) -> f64 {
        let exponent = (1.0 - progress.fraction()).powf(self.shape);
        1.0 - rng.gen::<f64>().powf(exponent)
    }
}

impl MutationOperator for NonUniformMutation {
    fn mutate<R: Rng>(&self, individual: &mut Individual, progress: Progress, rng: &mut R) {
        mutate_genes(individual, self.probability, rng, |current, bound, rng| {
            let magnitude = self.magnitude(progress, rng);
            if rng.gen_bool(0.5) {
                current - (current - bound.min) * magnitude
            } else {
                current + (bound.max - current) * magnitude
            }
        });
    }

    fn mutation_probability(&self) -> f64 {
        self.probability
    }
}
