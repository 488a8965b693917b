//! Error type shared by every fallible operation in the crate.
//!
//! "No room left" outcomes are not errors: placement and search return
//! `Ok(None)` for those. Errors are reserved for malformed requests.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoverageError {
    #[error("grid dimensions must be positive, got {x_range}×{y_range}")]
    InvalidDimension { x_range: usize, y_range: usize },

    #[error(
        "tower ({x},{y}) size {size_x}×{size_y} does not fit in a {x_range}×{y_range} grid"
    )]
    OutOfBounds {
        x: usize,
        y: usize,
        size_x: usize,
        size_y: usize,
        x_range: usize,
        y_range: usize,
    },

    #[error("target area contains no rows")]
    EmptyInput,

    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedInput {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, CoverageError>;
