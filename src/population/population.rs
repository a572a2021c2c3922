//! Population type
//!
//! This module provides the Population container type.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::fitness::traits::{fitness_key, Objective};
use crate::genome::bounds::MultiBounds;
use crate::population::individual::Individual;

/// Minimum, mean and maximum fitness of an evaluated population
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    /// Best (lowest) fitness
    pub min: f64,
    /// Mean fitness
    pub mean: f64,
    /// Worst (highest) fitness
    pub max: f64,
}

impl FitnessSummary {
    /// Summarize a slice of fitness values
    ///
    /// Returns `None` for an empty slice. NaN values propagate into `mean`.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self { min, mean, max })
    }
}

/// A population of individuals sharing one set of bounds
#[derive(Clone, Debug)]
pub struct Population {
    individuals: Vec<Individual>,
    bounds: Arc<MultiBounds>,
    generation: usize,
}

impl Population {
    /// Create an empty population with the given capacity
    pub fn with_capacity(bounds: Arc<MultiBounds>, capacity: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(capacity),
            bounds,
            generation: 0,
        }
    }

    /// Create a random population
    pub fn random<R: Rng>(size: usize, bounds: Arc<MultiBounds>, rng: &mut R) -> Self {
        let individuals = (0..size)
            .map(|_| Individual::random(Arc::clone(&bounds), rng))
            .collect();
        Self {
            individuals,
            bounds,
            generation: 0,
        }
    }

    /// Create a population from existing individuals
    ///
    /// Individuals built against different bounds are re-homed onto the
    /// population's bounds and clamped.
    pub fn from_individuals(bounds: Arc<MultiBounds>, individuals: Vec<Individual>) -> Self {
        let mut population = Self::with_capacity(bounds, individuals.len());
        for individual in individuals {
            population.push(individual);
        }
        population
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// The bounds shared by every individual
    pub fn bounds(&self) -> &Arc<MultiBounds> {
        &self.bounds
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an individual by index
    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    /// Add an individual to the population
    ///
    /// An individual built against other bounds is moved onto this
    /// population's bounds first.
    pub fn push(&mut self, individual: Individual) {
        self.individuals
            .push(individual.rebind(Arc::clone(&self.bounds)));
    }

    /// Replace the individual at `index`
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn replace(&mut self, index: usize, individual: Individual) {
        self.individuals[index] = individual.rebind(Arc::clone(&self.bounds));
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// Get the underlying slice of individuals
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Take the individuals out of this population
    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }

    /// Get the best individual (lowest fitness)
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .filter(|i| i.is_evaluated())
            .min_by(|a, b| fitness_key(a.fitness()).total_cmp(&fitness_key(b.fitness())))
    }

    /// Index of the worst individual (highest fitness; unevaluated counts as worst)
    pub fn worst_index(&self) -> Option<usize> {
        self.individuals
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| fitness_key(a.fitness()).total_cmp(&fitness_key(b.fitness())))
            .map(|(index, _)| index)
    }

    /// Sort the population by fitness (best first)
    ///
    /// The sort is stable, so ties keep their current order.
    pub fn sort_by_fitness(&mut self) {
        self.individuals
            .sort_by(|a, b| fitness_key(a.fitness()).total_cmp(&fitness_key(b.fitness())));
    }

    /// Copies of the `count` best evaluated individuals, best first
    pub fn elites(&self, count: usize) -> Vec<Individual> {
        let mut ranked: Vec<&Individual> =
            self.individuals.iter().filter(|i| i.is_evaluated()).collect();
        ranked.sort_by(|a, b| fitness_key(a.fitness()).total_cmp(&fitness_key(b.fitness())));
        ranked.into_iter().take(count).cloned().collect()
    }

    /// Check if all individuals have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.individuals.iter().all(Individual::is_evaluated)
    }

    /// Fitness values in population order, unevaluated individuals as `+inf`
    pub fn fitness_values(&self) -> Vec<f64> {
        self.individuals
            .iter()
            .map(|i| i.fitness().unwrap_or(f64::INFINITY))
            .collect()
    }

    /// Min, mean and max over the evaluated individuals
    pub fn fitness_summary(&self) -> Option<FitnessSummary> {
        let values: Vec<f64> = self.individuals.iter().filter_map(Individual::fitness).collect();
        FitnessSummary::from_values(&values)
    }

    /// Evaluate every individual lacking a fitness value (sequential)
    ///
    /// Returns the number of objective calls made.
    pub fn evaluate<O>(&mut self, objective: &O) -> usize
    where
        O: Objective + ?Sized,
    {
        let mut evaluations = 0;
        for individual in &mut self.individuals {
            if !individual.is_evaluated() {
                individual.evaluate(objective);
                evaluations += 1;
            }
        }
        evaluations
    }

    /// Average pairwise distance between individuals
    pub fn diversity(&self) -> f64 {
        let n = self.len();
        if n < 2 {
            return 0.0;
        }

        let mut total_distance = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                total_distance += self.individuals[i].distance(&self.individuals[j]);
            }
        }
        total_distance / (n * (n - 1) / 2) as f64
    }
}

/// Parallel evaluation support (requires `parallel` feature)
#[cfg(feature = "parallel")]
impl Population {
    /// Evaluate every individual lacking a fitness value (parallel)
    ///
    /// Each evaluation reads only its own individual's genes, so the result
    /// is identical to [`Population::evaluate`].
    pub fn evaluate_parallel<O>(&mut self, objective: &O) -> usize
    where
        O: Objective + ?Sized,
    {
        self.individuals
            .par_iter_mut()
            .filter(|i| !i.is_evaluated())
            .map(|individual| {
                individual.evaluate(objective);
                1usize
            })
            .sum()
    }
}

/// Sequential fallback for parallel evaluation (when `parallel` feature is disabled)
#[cfg(not(feature = "parallel"))]
impl Population {
    /// Evaluate every individual lacking a fitness value (sequential fallback)
    pub fn evaluate_parallel<O>(&mut self, objective: &O) -> usize
    where
        O: Objective + ?Sized,
    {
        self.evaluate(objective)
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Individual;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl IntoIterator for Population {
    type Item = Individual;
    type IntoIter = std::vec::IntoIter<Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}
