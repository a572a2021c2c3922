//! Error types for adaptive-ga
//!
//! Every error in this crate is a configuration error raised while a run is
//! being set up. Once a [`GeneticAlgorithm`](crate::algorithms::genetic_algorithm::GeneticAlgorithm)
//! is built, the generational loop itself has no failure states.

use thiserror::Error;

/// Error type for genome encoding problems
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenomeError {
    /// Dimension mismatch between genes and bounds
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A single dimension has unusable bounds
    #[error("Invalid bounds for dimension {index}: [{min}, {max}]")]
    InvalidBounds { index: usize, min: f64, max: f64 },

    /// No dimensions were given
    #[error("Bounds must describe at least one dimension")]
    EmptyBounds,

    /// Every dimension is pinned to a single value, so there is nothing to search
    #[error("At least one dimension must satisfy min < max")]
    DegenerateBounds,
}

/// Error type for operator construction
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Invalid operator configuration
    #[error("Invalid operator configuration: {0}")]
    InvalidConfiguration(String),
}

impl OperatorError {
    /// Validate that `value` is a probability in [0, 1]
    pub(crate) fn check_probability(name: &str, value: f64) -> Result<f64, Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(Self::InvalidConfiguration(format!(
                "{name} must be in [0, 1], got {value}"
            )))
        }
    }
}

/// Top-level error type for evolution runs
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Genome error
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;
