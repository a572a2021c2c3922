//! Search-domain encoding
//!
//! Genes are plain `f64` vectors; this module holds the box bounds they live in.

pub mod bounds;

pub mod prelude {
    pub use super::bounds::*;
}
