//! Objective abstraction
//!
//! This module provides the objective function interface and fitness ordering.

pub mod traits;

pub mod prelude {
    pub use super::traits::*;
}
