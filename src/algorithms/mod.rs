//! Evolutionary algorithms
//!
//! This module provides the elitist generational genetic algorithm.

pub mod genetic_algorithm;

pub mod prelude {
    pub use super::genetic_algorithm::*;
}
