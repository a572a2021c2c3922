//! Bounds for gene values
//!
//! This module provides the box constraints that define the search domain.

use serde::{Deserialize, Serialize};

use crate::error::GenomeError;

/// Bounds for a single dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl Bounds {
    /// Create new bounds
    ///
    /// The pair is not checked here; [`MultiBounds`] validates every
    /// dimension when the search domain is assembled.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Create symmetric bounds centered at 0
    pub fn symmetric(half_width: f64) -> Self {
        Self::new(-half_width, half_width)
    }

    /// Get the range (max - min)
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Check if these bounds are usable: finite, ordered, and with a
    /// representable range
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && self.range().is_finite()
    }

    /// Check if the dimension is pinned to a single value
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Check if a value is within bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a value to be within bounds
    ///
    /// A NaN value is pulled to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Multi-dimensional bounds
///
/// Always holds at least one dimension, every dimension is finite with
/// `min <= max` and a finite `max - min`, and at least one dimension has
/// `min < max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bounds>", into = "Vec<Bounds>")]
pub struct MultiBounds {
    bounds: Vec<Bounds>,
}

impl MultiBounds {
    /// Create new multi-dimensional bounds
    pub fn new(bounds: Vec<Bounds>) -> Result<Self, GenomeError> {
        if bounds.is_empty() {
            return Err(GenomeError::EmptyBounds);
        }
        if let Some((index, b)) = bounds.iter().enumerate().find(|(_, b)| !b.is_valid()) {
            return Err(GenomeError::InvalidBounds {
                index,
                min: b.min,
                max: b.max,
            });
        }
        if bounds.iter().all(Bounds::is_degenerate) {
            return Err(GenomeError::DegenerateBounds);
        }
        Ok(Self { bounds })
    }

    /// Create from `(min, max)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self, GenomeError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self::new(pairs.into_iter().map(Bounds::from).collect())
    }

    /// Create uniform bounds for all dimensions
    pub fn uniform(bound: Bounds, dimension: usize) -> Result<Self, GenomeError> {
        Self::new(vec![bound; dimension])
    }

    /// Create symmetric bounds for all dimensions
    pub fn symmetric(half_width: f64, dimension: usize) -> Result<Self, GenomeError> {
        Self::uniform(Bounds::symmetric(half_width), dimension)
    }

    /// Get number of dimensions
    pub fn dimension(&self) -> usize {
        self.bounds.len()
    }

    /// Get bounds for a specific dimension
    pub fn get(&self, index: usize) -> Option<&Bounds> {
        self.bounds.get(index)
    }

    /// Iterate over the per-dimension bounds
    pub fn iter(&self) -> impl Iterator<Item = &Bounds> {
        self.bounds.iter()
    }

    /// Clamp a vector to be within bounds
    pub fn clamp_vec(&self, values: &mut [f64]) {
        for (value, b) in values.iter_mut().zip(&self.bounds) {
            *value = b.clamp(*value);
        }
    }

    /// Check if all values are within bounds
    pub fn contains_vec(&self, values: &[f64]) -> bool {
        values.len() == self.bounds.len()
            && values
                .iter()
                .zip(&self.bounds)
                .all(|(&v, b)| b.contains(v))
    }
}

impl TryFrom<Vec<Bounds>> for MultiBounds {
    type Error = GenomeError;

    fn try_from(bounds: Vec<Bounds>) -> Result<Self, Self::Error> {
        Self::new(bounds)
    }
}

impl From<MultiBounds> for Vec<Bounds> {
    fn from(bounds: MultiBounds) -> Self {
        bounds.bounds
    }
}
