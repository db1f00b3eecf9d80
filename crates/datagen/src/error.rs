//! Result and Error types for xsgrid-datagen

use crate::quantity::Quantity;

/// Type alias for `Result<T, datagen::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `xsgrid-datagen` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration value outside of its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Secondary grid starts at or above its upper boundary
    #[error("inverted boundary at {primary}, lower ({lower}) is not below upper ({upper})")]
    InvertedBoundary { primary: f64, lower: f64, upper: f64 },

    /// Forward data has nothing to build a union grid from
    #[error("forward data has no energy grid within [{min}, {max}]")]
    EmptyForwardData { min: f64, max: f64 },

    /// Quantity missing from the forward data
    #[error("no forward data for {0}")]
    MissingForwardData(Quantity),

    /// Could not parse a quantity name
    #[error("unrecognised quantity \"{0}\"")]
    UnknownQuantity(String),

    /// Failure while generating a single quantity
    #[error("failed to generate {quantity}")]
    Quantity {
        quantity: Quantity,
        #[source]
        source: Box<Error>,
    },

    /// Failure in grid generation
    #[error(transparent)]
    Grid(#[from] xsgrid_grid::Error),

    /// Failure in an interpolation policy
    #[error(transparent)]
    Interp(#[from] xsgrid_interp::Error),

    /// Failure to (de)serialise JSON
    #[error("failed serde JSON operation")]
    Json(#[from] serde_json::Error),

    /// Underlying file I/O error
    #[error("failure in file I/O")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach the quantity being generated to an error
    pub(crate) fn for_quantity(self, quantity: Quantity) -> Self {
        Self::Quantity {
            quantity,
            source: Box::new(self),
        }
    }
}
