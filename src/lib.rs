//! # adaptive-ga
//!
//! An elitist, real-valued genetic algorithm for single-objective
//! minimization over box-bounded domains.
//!
//! ## Core Concepts
//!
//! - **Minimization**: lower fitness is better throughout the crate
//! - **Pluggable Operators**: selection, crossover and mutation are traits the
//!   driver is generic over
//! - **Adaptive Crossover**: the crossover rate can follow each pair's fitness
//!   relative to the population
//! - **Elitism**: the best fitness found is never lost between generations
//!
//! ## Quick Start
//!
//! ```rust
//! use adaptive_ga::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let ga = GeneticAlgorithm::builder()
//!     .bounds(MultiBounds::from_pairs([(-10.0, 10.0), (-10.0, 10.0)])?)
//!     .population_size(50)
//!     .selection(RouletteSelection::new())
//!     .crossover(ArithmeticCrossover::adaptive(0.6, 0.9)?)
//!     .mutation(NonUniformMutation::new(0.1)?)
//!     .build()?;
//!
//! let result = ga.run_for(&|x: &[f64]| x.iter().map(|v| v * v).sum::<f64>(), 100, &mut rng)?;
//! assert!(result.evaluation < 1.0);
//! # Ok::<(), EvolutionError>(())
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
