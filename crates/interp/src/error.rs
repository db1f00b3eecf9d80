//! Result and Error types for xsgrid-interp

use crate::law::Law;

/// Type alias for `Result<T, interp::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `xsgrid-interp` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// Value outside of the valid domain of an axis, e.g. non-positive on Log
    #[error("{value} is not valid on a {law} axis")]
    InvalidValue { law: Law, value: f64 },

    /// Requested value is not covered by a tabulated grid
    #[error("{value} lies outside of the grid [{lower}, {upper}]")]
    OutsideOfGrid { value: f64, lower: f64, upper: f64 },

    /// Tabulated grids need a lower and upper bound at the very least
    #[error("grid needs at least {required} points, found {found}")]
    TooFewPoints { found: usize, required: usize },

    /// Independent and dependent values must pair up
    #[error("grid has {indep} independent values but {dep} dependent values")]
    MismatchedLengths { indep: usize, dep: usize },

    /// Primary values must satisfy x0 <= x <= x1 with x0 < x1
    #[error("primary value {x} is not within [{x0}, {x1}]")]
    InvalidPrimaryBounds { x0: f64, x1: f64, x: f64 },

    /// Failed to infer a law or policy from a name
    #[error("failed to infer interpolation from \"{hint}\"")]
    CouldNotInferPolicy { hint: String },

    /// Failure in a bin search on a grid
    #[error("grid search failed")]
    Search(#[from] xsgrid_utils::Error),
}
