//! Objective traits
//!
//! The objective is the only external collaborator of the engine: a pure
//! function from genes to a real value that the engine tries to minimize.

/// Ranking key for an optional fitness value
///
/// Lower is better. Unevaluated individuals and NaN fitness rank as
/// `+inf`, so they only come out on top when nothing comparable exists.
pub fn fitness_key(fitness: Option<f64>) -> f64 {
    match fitness {
        Some(f) if !f.is_nan() => f,
        _ => f64::INFINITY,
    }
}

/// Objective function trait
///
/// Implemented for every `Fn(&[f64]) -> f64`, so closures and plain
/// functions can be passed directly.
#[cfg(feature = "parallel")]
pub trait Objective: Sync {
    /// Evaluate the objective (lower = better)
    fn evaluate(&self, genes: &[f64]) -> f64;
}

/// Objective function trait (non-parallel version)
///
/// Implemented for every `Fn(&[f64]) -> f64`, so closures and plain
/// functions can be passed directly.
#[cfg(not(feature = "parallel"))]
pub trait Objective {
    /// Evaluate the objective (lower = better)
    fn evaluate(&self, genes: &[f64]) -> f64;
}

#[cfg(feature = "parallel")]
impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn evaluate(&self, genes: &[f64]) -> f64 {
        self(genes)
    }
}

#[cfg(not(feature = "parallel"))]
impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64,
{
    fn evaluate(&self, genes: &[f64]) -> f64 {
        self(genes)
    }
}

/// A wrapper that negates an objective, turning a maximization problem into
/// the minimization the engine performs
pub struct Maximize<O> {
    inner: O,
}

impl<O> Maximize<O> {
    /// Wrap an objective to be maximized
    pub fn new(objective: O) -> Self {
        Self { inner: objective }
    }
}

impl<O: Objective> Objective for Maximize<O> {
    fn evaluate(&self, genes: &[f64]) -> f64 {
        -self.inner.evaluate(genes)
    }
}
