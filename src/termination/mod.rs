//! Termination
//!
//! Why a run ended, the cooperative stop signal, and the opt-in fitness
//! convergence test.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::population::population::FitnessSummary;

/// Reason a run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The generation budget was used up
    MaxGenerations,
    /// The population's fitness spread fell within tolerance
    Converged,
    /// A [`StopSignal`] was raised
    Stopped,
}

impl Termination {
    /// Human-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MaxGenerations => "Maximum generations reached",
            Self::Converged => "Fitness converged",
            Self::Stopped => "Stopped by signal",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// External request to stop a run
///
/// Clones share the same flag, so one clone can be handed to another thread
/// while the run polls the other. The flag is read once per generation
/// boundary; the current generation always completes.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    /// Create a signal that is not raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop after the current generation
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check whether a stop was requested
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Lower the signal so it can be reused for another run
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Terminate when the fitness spread of a population is within tolerance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitnessConvergence {
    tolerance: f64,
}

impl FitnessConvergence {
    /// Create a convergence test with the given tolerance
    pub fn new(tolerance: f64) -> EvoResult<Self> {
        if !(tolerance >= 0.0 && tolerance.is_finite()) {
            return Err(EvolutionError::Configuration(format!(
                "convergence tolerance must be non-negative and finite, got {tolerance}"
            )));
        }
        Ok(Self { tolerance })
    }

    /// The tolerance
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Check whether `max - min <= tolerance`
    pub fn is_converged(&self, summary: &FitnessSummary) -> bool {
        summary.max - summary.min <= self.tolerance
    }
}

pub mod prelude {
    pub use super::{FitnessConvergence, StopSignal, Termination};
}
