//! Elitist generational genetic algorithm
//!
//! Each generation is built as a new [`Population`] from the previous one:
//! select, recombine pairwise, mutate, evaluate, then re-inject the previous
//! generation's elites that no offspring matched.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::diagnostics::{EvolutionStats, GenerationStats, RunResult};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::{fitness_key, Objective};
use crate::genome::bounds::MultiBounds;
use crate::operators::crossover::pairwise_crossover;
use crate::operators::traits::{CrossoverOperator, MutationOperator, Progress, SelectionOperator};
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::termination::{FitnessConvergence, StopSignal, Termination};

/// Configuration for the genetic algorithm
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Population size
    pub population_size: usize,
    /// Number of elite individuals protected between generations
    pub elite_count: usize,
    /// Generation budget used by [`GeneticAlgorithm::run`]
    pub max_generations: usize,
    /// Whether to evaluate in parallel (needs the `parallel` feature)
    pub parallel_evaluation: bool,
    /// Stop early once `max - min` fitness is within this tolerance
    pub convergence_tolerance: Option<f64>,
    /// Record population diversity in each generation's statistics
    pub track_diversity: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            elite_count: 1,
            max_generations: 100,
            parallel_evaluation: false,
            convergence_tolerance: None,
            track_diversity: false,
        }
    }
}

impl GaConfig {
    /// Check sizes and tolerances
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_size < 2 {
            return Err(EvolutionError::Configuration(format!(
                "population size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.elite_count == 0 || self.elite_count >= self.population_size {
            return Err(EvolutionError::Configuration(format!(
                "elite count must be in [1, {}), got {}",
                self.population_size, self.elite_count
            )));
        }
        if let Some(tolerance) = self.convergence_tolerance {
            FitnessConvergence::new(tolerance)?;
        }
        Ok(())
    }
}

/// Builder for GeneticAlgorithm
pub struct GeneticAlgorithmBuilder<S, C, M> {
    config: GaConfig,
    bounds: Option<MultiBounds>,
    selection: Option<S>,
    crossover: Option<C>,
    mutation: Option<M>,
}

impl GeneticAlgorithmBuilder<(), (), ()> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: GaConfig::default(),
            bounds: None,
            selection: None,
            crossover: None,
            mutation: None,
        }
    }
}

impl Default for GeneticAlgorithmBuilder<(), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C, M> GeneticAlgorithmBuilder<S, C, M> {
    /// Replace the whole configuration
    pub fn config(mut self, config: GaConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the number of elite individuals to preserve
    pub fn elite_count(mut self, count: usize) -> Self {
        self.config.elite_count = count;
        self
    }

    /// Set the generation budget of [`GeneticAlgorithm::run`]
    pub fn max_generations(mut self, generations: usize) -> Self {
        self.config.max_generations = generations;
        self
    }

    /// Enable or disable parallel evaluation
    pub fn parallel_evaluation(mut self, enabled: bool) -> Self {
        self.config.parallel_evaluation = enabled;
        self
    }

    /// Stop early when the population's fitness spread is within `tolerance`
    pub fn convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.config.convergence_tolerance = Some(tolerance);
        self
    }

    /// Record population diversity every generation
    pub fn track_diversity(mut self, enabled: bool) -> Self {
        self.config.track_diversity = enabled;
        self
    }

    /// Set the search space bounds
    pub fn bounds(mut self, bounds: MultiBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Set the selection operator
    pub fn selection<NewS>(self, selection: NewS) -> GeneticAlgorithmBuilder<NewS, C, M>
    where
        NewS: SelectionOperator,
    {
        GeneticAlgorithmBuilder {
            config: self.config,
            bounds: self.bounds,
            selection: Some(selection),
            crossover: self.crossover,
            mutation: self.mutation,
        }
    }

    /// Set the crossover operator
    pub fn crossover<NewC>(self, crossover: NewC) -> GeneticAlgorithmBuilder<S, NewC, M>
    where
        NewC: CrossoverOperator,
    {
        GeneticAlgorithmBuilder {
            config: self.config,
            bounds: self.bounds,
            selection: self.selection,
            crossover: Some(crossover),
            mutation: self.mutation,
        }
    }

    /// Set the mutation operator
    pub fn mutation<NewM>(self, mutation: NewM) -> GeneticAlgorithmBuilder<S, C, NewM>
    where
        NewM: MutationOperator,
    {
        GeneticAlgorithmBuilder {
            config: self.config,
            bounds: self.bounds,
            selection: self.selection,
            crossover: self.crossover,
            mutation: Some(mutation),
        }
    }
}

impl<S, C, M> GeneticAlgorithmBuilder<S, C, M>
where
    S: SelectionOperator,
    C: CrossoverOperator,
    M: MutationOperator,
{
    /// Validate the configuration and build the GeneticAlgorithm instance
    pub fn build(self) -> EvoResult<GeneticAlgorithm<S, C, M>> {
        let bounds = self
            .bounds
            .ok_or_else(|| EvolutionError::Configuration("Bounds must be specified".to_string()))?;

        let selection = self.selection.ok_or_else(|| {
            EvolutionError::Configuration("Selection operator must be specified".to_string())
        })?;

        let crossover = self.crossover.ok_or_else(|| {
            EvolutionError::Configuration("Crossover operator must be specified".to_string())
        })?;

        let mutation = self.mutation.ok_or_else(|| {
            EvolutionError::Configuration("Mutation operator must be specified".to_string())
        })?;

        self.config.validate()?;
        let convergence = self
            .config
            .convergence_tolerance
            .map(FitnessConvergence::new)
            .transpose()?;

        Ok(GeneticAlgorithm {
            config: self.config,
            bounds: Arc::new(bounds),
            selection,
            crossover,
            mutation,
            convergence,
        })
    }
}

/// Elitist generational genetic algorithm (minimizing)
pub struct GeneticAlgorithm<S, C, M> {
    config: GaConfig,
    bounds: Arc<MultiBounds>,
    selection: S,
    crossover: C,
    mutation: M,
    convergence: Option<FitnessConvergence>,
}

impl GeneticAlgorithm<(), (), ()> {
    /// Create a builder for GeneticAlgorithm
    pub fn builder() -> GeneticAlgorithmBuilder<(), (), ()> {
        GeneticAlgorithmBuilder::new()
    }
}

impl<S, C, M> GeneticAlgorithm<S, C, M>
where
    S: SelectionOperator,
    C: CrossoverOperator,
    M: MutationOperator,
{
    /// The validated configuration
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// The search space bounds
    pub fn bounds(&self) -> &MultiBounds {
        &self.bounds
    }

    /// Run for the configured generation budget
    pub fn run<O, R>(&self, objective: &O, rng: &mut R) -> EvoResult<RunResult>
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        self.run_for(objective, self.config.max_generations, rng)
    }

    /// Run for an explicit generation budget
    pub fn run_for<O, R>(&self, objective: &O, generations: usize, rng: &mut R) -> EvoResult<RunResult>
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        self.run_until(objective, generations, &StopSignal::new(), rng)
    }

    /// Run for an explicit generation budget, polling `stop` between generations
    ///
    /// A raised signal ends the run with the best individual found so far.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            population_size = self.config.population_size,
            dimension = self.bounds.dimension(),
            generations = generations
        )
    )]
    pub fn run_until<O, R>(
        &self,
        objective: &O,
        generations: usize,
        stop: &StopSignal,
        rng: &mut R,
    ) -> EvoResult<RunResult>
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        let start_time = Instant::now();
        let mut warned_non_finite = false;

        let mut population =
            Population::random(self.config.population_size, Arc::clone(&self.bounds), rng);
        let mut evaluations = self.evaluate(&mut population, objective);
        warn_non_finite(&population, &mut warned_non_finite);

        let mut best = population
            .best()
            .ok_or(EvolutionError::EmptyPopulation)?
            .clone();

        let mut stats = EvolutionStats::new();
        let mut history = vec![best_fitness(&best)];
        stats.record(self.generation_stats(&population, evaluations, &best));

        let termination = loop {
            let generation = population.generation();
            if generation >= generations {
                break Termination::MaxGenerations;
            }
            if stop.is_stopped() {
                break Termination::Stopped;
            }
            if let (Some(convergence), Some(summary)) =
                (self.convergence, population.fitness_summary())
            {
                if convergence.is_converged(&summary) {
                    break Termination::Converged;
                }
            }

            let progress = Progress::new(generation, generations);
            let (next, used) = self.next_generation(&population, objective, progress, rng)?;
            evaluations += used;
            population = next;
            warn_non_finite(&population, &mut warned_non_finite);

            if let Some(candidate) = population.best() {
                if candidate.is_better_than(&best) {
                    best = candidate.clone();
                }
            }

            let gen_stats = self.generation_stats(&population, evaluations, &best);
            debug!(
                generation = gen_stats.generation,
                best_of_run = gen_stats.best_of_run,
                mean = gen_stats.mean_fitness,
                "generation complete"
            );
            history.push(gen_stats.best_of_run);
            stats.record(gen_stats);
        };

        stats.set_termination(termination);
        stats.set_runtime(start_time.elapsed());

        let evaluation = best_fitness(&best);
        info!(
            generations = population.generation(),
            evaluations,
            evaluation,
            reason = termination.reason(),
            "run finished"
        );

        Ok(RunResult {
            solution: best.into_genes(),
            evaluation,
            history,
            generations: population.generation(),
            evaluations,
            termination,
            stats,
        })
    }

    fn generation_stats(
        &self,
        population: &Population,
        evaluations: usize,
        best: &Individual,
    ) -> GenerationStats {
        let stats = GenerationStats::from_population(population, evaluations, best_fitness(best));
        if self.config.track_diversity {
            stats.with_diversity(population)
        } else {
            stats
        }
    }

    /// Evaluate every individual lacking fitness, returning the call count
    fn evaluate<O>(&self, population: &mut Population, objective: &O) -> usize
    where
        O: Objective + ?Sized,
    {
        if self.config.parallel_evaluation {
            population.evaluate_parallel(objective)
        } else {
            population.evaluate(objective)
        }
    }

    /// Build and evaluate the generation following `population`
    fn next_generation<O, R>(
        &self,
        population: &Population,
        objective: &O,
        progress: Progress,
        rng: &mut R,
    ) -> EvoResult<(Population, usize)>
    where
        O: Objective + ?Sized,
        R: Rng,
    {
        let summary = population
            .fitness_summary()
            .ok_or(EvolutionError::EmptyPopulation)?;
        let next_generation = population.generation() + 1;

        let fitnesses = population.fitness_values();
        let parents: Vec<Individual> = self
            .selection
            .select_many(&fitnesses, population.len(), rng)
            .into_iter()
            .map(|index| population[index].clone())
            .collect();

        let mut offspring = pairwise_crossover(&self.crossover, &parents, &summary, rng);
        for child in &mut offspring {
            self.mutation.mutate(child, progress, rng);
        }

        let offspring = offspring
            .into_iter()
            .map(|child| {
                if child.is_evaluated() {
                    child
                } else {
                    child.with_generation(next_generation)
                }
            })
            .collect();

        let mut next = Population::from_individuals(Arc::clone(population.bounds()), offspring);
        next.set_generation(next_generation);
        let evaluations = self.evaluate(&mut next, objective);

        preserve_elites(population, &mut next, self.config.elite_count);
        Ok((next, evaluations))
    }
}

/// Re-inject the previous generation's elites that no offspring matched
///
/// The i-th best of `previous` (0-based) replaces the worst unprotected
/// member of `next` unless at least `i + 1` members of `next` are already
/// as good. Both populations must be evaluated. Returns how many elites
/// were injected.
fn preserve_elites(previous: &Population, next: &mut Population, elite_count: usize) -> usize {
    let mut protected: Vec<usize> = Vec::with_capacity(elite_count);

    for (rank, elite) in previous.elites(elite_count).into_iter().enumerate() {
        let key = fitness_key(elite.fitness());
        let as_good = next
            .iter()
            .filter(|member| fitness_key(member.fitness()) <= key)
            .count();
        if as_good > rank {
            continue;
        }

        let worst = next
            .iter()
            .enumerate()
            .filter(|(index, _)| !protected.contains(index))
            .max_by(|(_, a), (_, b)| fitness_key(a.fitness()).total_cmp(&fitness_key(b.fitness())))
            .map(|(index, _)| index);

        if let Some(index) = worst {
            debug!(
                rank,
                fitness = key,
                replaced = fitness_key(next[index].fitness()),
                "elite re-injected"
            );
            next.replace(index, elite);
            protected.push(index);
        }
    }

    protected.len()
}

/// Fitness of an evaluated individual, `+inf` if it never was
fn best_fitness(individual: &Individual) -> f64 {
    individual.fitness().unwrap_or(f64::INFINITY)
}

fn warn_non_finite(population: &Population, warned: &mut bool) {
    if *warned {
        return;
    }
    let count = population
        .iter()
        .filter(|i| i.fitness().is_some_and(|f| !f.is_finite()))
        .count();
    if count > 0 {
        warn!(
            generation = population.generation(),
            count, "objective returned non-finite fitness values"
        );
        *warned = true;
    }
}
