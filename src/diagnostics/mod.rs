//! Diagnostics and statistics
//!
//! Per-generation population statistics, the run-level collector, and the
//! result handed back to the caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fitness::traits::fitness_key;
use crate::population::population::Population;
use crate::termination::Termination;

/// Statistics for a single generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Total objective evaluations so far
    pub evaluations: usize,
    /// Best (lowest) fitness in this generation's population
    pub best_fitness: f64,
    /// Worst (highest) fitness in this generation's population
    pub worst_fitness: f64,
    /// Mean fitness
    pub mean_fitness: f64,
    /// Median fitness
    pub median_fitness: f64,
    /// Fitness standard deviation
    pub fitness_std: f64,
    /// Best fitness of the whole run so far
    pub best_of_run: f64,
    /// Population diversity, when tracked
    pub diversity: Option<f64>,
}

impl GenerationStats {
    /// Compute statistics from an evaluated population
    ///
    /// Unevaluated individuals are skipped. NaN fitness sorts last.
    /// Diversity is left empty; see [`GenerationStats::with_diversity`].
    pub fn from_population(
        population: &Population,
        evaluations: usize,
        best_of_run: f64,
    ) -> Self {
        let mut fitnesses: Vec<f64> = population.iter().filter_map(|i| i.fitness()).collect();
        fitnesses.sort_by(|a, b| fitness_key(Some(*a)).total_cmp(&fitness_key(Some(*b))));

        let (best, worst, mean, median, std) = if fitnesses.is_empty() {
            (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0.0, 0.0)
        } else {
            let n = fitnesses.len();
            let mean = fitnesses.iter().sum::<f64>() / n as f64;
            let median = if n % 2 == 0 {
                (fitnesses[n / 2 - 1] + fitnesses[n / 2]) / 2.0
            } else {
                fitnesses[n / 2]
            };
            let variance = if n > 1 {
                fitnesses.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / (n - 1) as f64
            } else {
                0.0
            };
            (fitnesses[0], fitnesses[n - 1], mean, median, variance.sqrt())
        };

        Self {
            generation: population.generation(),
            evaluations,
            best_fitness: best,
            worst_fitness: worst,
            mean_fitness: mean,
            median_fitness: median,
            fitness_std: std,
            best_of_run,
            diversity: None,
        }
    }

    /// Attach the population's mean pairwise distance
    ///
    /// Costs O(N² · d), so the driver only calls this when asked to.
    pub fn with_diversity(mut self, population: &Population) -> Self {
        self.diversity = Some(population.diversity());
        self
    }
}

/// Statistics collector for an entire run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Statistics per generation
    pub generations: Vec<GenerationStats>,
    /// Total runtime in milliseconds
    pub total_runtime_ms: f64,
    /// Reason for termination
    pub termination: Option<Termination>,
}

impl EvolutionStats {
    /// Create a new stats collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Lowest population fitness across all recorded generations
    pub fn best_fitness(&self) -> Option<f64> {
        self.generations
            .iter()
            .map(|g| g.best_fitness)
            .min_by(|a, b| fitness_key(Some(*a)).total_cmp(&fitness_key(Some(*b))))
    }

    /// Best-of-run fitness after each generation
    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.best_of_run).collect()
    }

    /// Mean population fitness per generation
    pub fn mean_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.mean_fitness).collect()
    }

    /// Population diversity of every generation that tracked it
    pub fn diversity_history(&self) -> Vec<f64> {
        self.generations.iter().filter_map(|g| g.diversity).collect()
    }

    /// Set the termination reason
    pub fn set_termination(&mut self, termination: Termination) {
        self.termination = Some(termination);
    }

    /// Set the total runtime
    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = duration.as_secs_f64() * 1000.0;
    }

    /// Get a summary of the run
    pub fn summary(&self) -> String {
        let best = self.best_fitness().unwrap_or(f64::INFINITY);
        let final_best = self
            .generations
            .last()
            .map(|g| g.best_of_run)
            .unwrap_or(f64::INFINITY);

        format!(
            "Evolution Summary:\n\
             - Generations: {}\n\
             - Best fitness: {:.6}\n\
             - Final best: {:.6}\n\
             - Runtime: {:.2}ms\n\
             - Termination: {}",
            self.num_generations(),
            best,
            final_best,
            self.total_runtime_ms,
            self.termination
                .map(|t| t.reason())
                .unwrap_or("unknown")
        )
    }
}

/// Outcome of a run
///
/// `evaluation` is exactly the objective value of `solution`, and the
/// minimum fitness observed during the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Best genes ever observed
    pub solution: Vec<f64>,
    /// Objective value of `solution`
    pub evaluation: f64,
    /// Best-of-run fitness after each generation, generation 0 first
    pub history: Vec<f64>,
    /// Number of generations completed
    pub generations: usize,
    /// Total objective evaluations
    pub evaluations: usize,
    /// Why the run ended
    pub termination: Termination,
    /// Statistics for the run
    pub stats: EvolutionStats,
}

impl RunResult {
    /// Total improvement from the initial population to the end of the run
    pub fn improvement(&self) -> f64 {
        match (self.history.first(), self.history.last()) {
            (Some(first), Some(last)) => first - last,
            _ => 0.0,
        }
    }
}

pub mod prelude {
    pub use super::{EvolutionStats, GenerationStats, RunResult};
}
