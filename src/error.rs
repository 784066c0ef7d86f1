//! Typed generation failures.

use thiserror::Error;

/// Errors surfaced by [`crate::generate`].
#[derive(Error, Debug)]
pub enum GenError {
    /// A configuration field is outside its documented range.
    #[error("invalid config: {field} = {value} ({expected})")]
    InvalidConfig {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// The point set triangulated to nothing usable.
    #[error("degenerate mesh: {0}")]
    DegenerateMesh(String),

    /// A pipeline invariant failed mid-generation; retry with another seed.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}
