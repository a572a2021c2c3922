//! Individual type
//!
//! An individual is one candidate solution: a bounded real vector plus its
//! fitness. All constructors and mutating accessors keep the genes inside
//! the bounds, so the domain invariant holds at every step of a run.

use std::sync::Arc;

use rand::Rng;

use crate::error::GenomeError;
use crate::fitness::traits::{fitness_key, Objective};
use crate::genome::bounds::MultiBounds;

/// An individual in the population
#[derive(Clone, Debug)]
pub struct Individual {
    genes: Vec<f64>,
    bounds: Arc<MultiBounds>,
    fitness: Option<f64>,
    birth_generation: usize,
}

impl Individual {
    /// Create an individual with genes drawn uniformly within bounds
    pub fn random<R: Rng>(bounds: Arc<MultiBounds>, rng: &mut R) -> Self {
        let genes = bounds
            .iter()
            .map(|b| {
                if b.is_degenerate() {
                    b.min
                } else {
                    rng.gen_range(b.min..=b.max)
                }
            })
            .collect();
        Self {
            genes,
            bounds,
            fitness: None,
            birth_generation: 0,
        }
    }

    /// Create an unevaluated individual from explicit genes
    ///
    /// Out-of-range genes are clamped into the bounds.
    pub fn from_genes(genes: Vec<f64>, bounds: Arc<MultiBounds>) -> Result<Self, GenomeError> {
        if genes.len() != bounds.dimension() {
            return Err(GenomeError::DimensionMismatch {
                expected: bounds.dimension(),
                actual: genes.len(),
            });
        }
        let mut individual = Self {
            genes,
            bounds,
            fitness: None,
            birth_generation: 0,
        };
        individual.clamp();
        Ok(individual)
    }

    /// Create an offspring sharing this individual's bounds
    ///
    /// `genes` must have the same dimension; the result is clamped and
    /// unevaluated.
    pub(crate) fn offspring(&self, genes: Vec<f64>) -> Self {
        debug_assert_eq!(genes.len(), self.genes.len());
        let mut child = Self {
            genes,
            bounds: Arc::clone(&self.bounds),
            fitness: None,
            birth_generation: self.birth_generation,
        };
        child.clamp();
        child
    }

    /// Move this individual onto another set of bounds
    ///
    /// Genes are padded or truncated to the new dimension and clamped. The
    /// fitness survives only if the genes come through unchanged.
    pub(crate) fn rebind(mut self, bounds: Arc<MultiBounds>) -> Self {
        if Arc::ptr_eq(&self.bounds, &bounds) {
            return self;
        }
        let before = self.genes.clone();
        self.genes.resize(bounds.dimension(), 0.0);
        self.bounds = bounds;
        self.clamp();
        if self.genes != before {
            self.fitness = None;
        }
        self
    }

    /// Set the generation this individual was created in
    pub fn with_generation(mut self, generation: usize) -> Self {
        self.birth_generation = generation;
        self
    }

    /// Clip every gene back into its bounds
    pub fn clamp(&mut self) {
        self.bounds.clamp_vec(&mut self.genes);
    }

    /// Evaluate the objective and store the result as this individual's fitness
    ///
    /// Non-finite results are stored unchanged.
    pub fn evaluate<O: Objective + ?Sized>(&mut self, objective: &O) -> f64 {
        let fitness = objective.evaluate(&self.genes);
        self.fitness = Some(fitness);
        fitness
    }

    /// The genes of this individual
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    /// Set a single gene, clamping it into bounds
    ///
    /// Clears the fitness if the stored value actually changes.
    pub fn set_gene(&mut self, index: usize, value: f64) {
        let Some(bound) = self.bounds.get(index) else {
            return;
        };
        let value = bound.clamp(value);
        if self.genes[index] != value {
            self.genes[index] = value;
            self.fitness = None;
        }
    }

    /// Take the genes out of this individual
    pub fn into_genes(self) -> Vec<f64> {
        self.genes
    }

    /// The bounds shared by this individual's population
    pub fn bounds(&self) -> &Arc<MultiBounds> {
        &self.bounds
    }

    /// Number of genes
    pub fn dimension(&self) -> usize {
        self.genes.len()
    }

    /// The fitness value (None if not yet evaluated)
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Check if this individual has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Generation when this individual was created
    pub fn birth_generation(&self) -> usize {
        self.birth_generation
    }

    /// Check if this individual is strictly better (lower fitness) than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        fitness_key(self.fitness) < fitness_key(other.fitness)
    }

    /// Euclidean distance between the genes of two individuals
    pub fn distance(&self, other: &Self) -> f64 {
        self.genes
            .iter()
            .zip(&other.genes)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bounds() -> Arc<MultiBounds> {
        Arc::new(MultiBounds::from_pairs([(-1.0, 1.0), (0.0, 10.0), (5.0, 5.0)]).unwrap())
    }

    #[test]
    fn test_random_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let bounds = bounds();
        for _ in 0..200 {
            let individual = Individual::random(Arc::clone(&bounds), &mut rng);
            assert_eq!(individual.dimension(), 3);
            assert!(bounds.contains_vec(individual.genes()));
            assert_eq!(individual.genes()[2], 5.0);
            assert!(!individual.is_evaluated());
        }
    }

    #[test]
    fn test_from_genes_clamps() {
        let individual = Individual::from_genes(vec![-3.0, 4.0, 0.0], bounds()).unwrap();
        assert_eq!(individual.genes(), &[-1.0, 4.0, 5.0]);
    }

    #[test]
    fn test_from_genes_dimension_mismatch() {
        let err = Individual::from_genes(vec![0.0], bounds()).unwrap_err();
        assert_eq!(
            err,
            GenomeError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn test_evaluate_sets_fitness() {
        let mut individual = Individual::from_genes(vec![0.5, 2.0, 5.0], bounds()).unwrap();
        let f = individual.evaluate(&|genes: &[f64]| genes.iter().sum::<f64>());
        assert_eq!(f, 7.5);
        assert_eq!(individual.fitness(), Some(7.5));
    }

    #[test]
    fn test_evaluate_keeps_non_finite() {
        let mut individual = Individual::from_genes(vec![0.0, 0.0, 5.0], bounds()).unwrap();
        individual.evaluate(&|_: &[f64]| f64::NAN);
        assert!(individual.fitness().unwrap().is_nan());
    }

    #[test]
    fn test_set_gene_clamps_and_invalidates() {
        let mut individual = Individual::from_genes(vec![0.0, 1.0, 5.0], bounds()).unwrap();
        individual.evaluate(&|_: &[f64]| 1.0);

        // Writing the same value keeps the fitness
        individual.set_gene(1, 1.0);
        assert!(individual.is_evaluated());

        individual.set_gene(1, 42.0);
        assert_eq!(individual.genes()[1], 10.0);
        assert!(!individual.is_evaluated());
    }

    #[test]
    fn test_is_better_than_minimizes() {
        let mut a = Individual::from_genes(vec![0.0, 0.0, 5.0], bounds()).unwrap();
        let mut b = a.clone();
        a.evaluate(&|_: &[f64]| 1.0);
        b.evaluate(&|_: &[f64]| 2.0);

        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
        assert!(!a.is_better_than(&a.clone()));
    }

    #[test]
    fn test_unevaluated_and_nan_rank_last() {
        let base = Individual::from_genes(vec![0.0, 0.0, 5.0], bounds()).unwrap();
        let mut evaluated = base.clone();
        evaluated.evaluate(&|_: &[f64]| 1e300);
        let mut nan = base.clone();
        nan.evaluate(&|_: &[f64]| f64::NAN);

        assert!(evaluated.is_better_than(&base));
        assert!(evaluated.is_better_than(&nan));
        assert!(!nan.is_better_than(&base));
    }

    #[test]
    fn test_offspring_shares_bounds() {
        let parent = Individual::from_genes(vec![0.0, 0.0, 5.0], bounds()).unwrap();
        let child = parent.offspring(vec![9.0, -9.0, 0.0]);
        assert!(Arc::ptr_eq(parent.bounds(), child.bounds()));
        assert_eq!(child.genes(), &[1.0, 0.0, 5.0]);
    }

    #[test]
    fn test_rebind_keeps_fitness_only_when_genes_survive() {
        let mut inside = Individual::from_genes(vec![0.5, 2.0, 5.0], bounds()).unwrap();
        inside.evaluate(&|_: &[f64]| 3.0);
        let mut outside = Individual::from_genes(vec![0.5, 8.0, 5.0], bounds()).unwrap();
        outside.evaluate(&|_: &[f64]| 3.0);

        let narrow = Arc::new(MultiBounds::from_pairs([(-1.0, 1.0), (0.0, 4.0), (5.0, 5.0)]).unwrap());
        let inside = inside.rebind(Arc::clone(&narrow));
        let outside = outside.rebind(narrow);

        assert_eq!(inside.fitness(), Some(3.0));
        assert_eq!(outside.genes(), &[0.5, 4.0, 5.0]);
        assert_eq!(outside.fitness(), None);
    }

    #[test]
    fn test_distance() {
        let a = Individual::from_genes(vec![0.0, 0.0, 5.0], bounds()).unwrap();
        let b = Individual::from_genes(vec![0.6, 0.8, 5.0], bounds()).unwrap();
        assert!((a.distance(&b) - 1.0).abs() < 1e-12);
    }
}
