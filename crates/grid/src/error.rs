//! Result and Error types for xsgrid-grid

use crate::generator::Bin;

/// Type alias for `Result<T, grid::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `xsgrid-grid` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// Tolerance outside of its valid range
    #[error("{name} = {value} is outside of {range}")]
    InvalidTolerance {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    /// Refinement needs a lower and upper bound at the very least
    #[error("grid needs at least {required} points, found {found}")]
    TooFewPoints { found: usize, required: usize },

    /// Grid points must be strictly ascending
    #[error("grid points are not strictly ascending")]
    UnsortedGrid,

    /// Requested refinement window is empty or inverted
    #[error("invalid bounds, min ({min}) must be below max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    /// Evaluator returned NaN or infinity
    #[error("evaluation at x = {x} returned {value}")]
    NonFiniteEvaluation { x: f64, value: f64 },

    /// Tolerance hit before convergence when dirty convergence is an error
    #[error("dirty convergence on [{}, {}]: {reason}", .bin.lower, .bin.upper)]
    DirtyConvergence { reason: String, bin: Bin },

    /// Two dimensional grid with inconsistent secondary grids
    #[error("expected {expected} secondary grids, found {found}")]
    MismatchedSecondaryGrids { expected: usize, found: usize },

    /// Failure in an interpolation policy
    #[error(transparent)]
    Interp(#[from] xsgrid_interp::Error),

    /// Failure in a grid utility
    #[error(transparent)]
    Utils(#[from] xsgrid_utils::Error),
}
