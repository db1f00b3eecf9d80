//! Errors from searching float grids

/// Type alias for `Result<T, utils::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for `xsgrid_utils`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Searched value is not within the grid limits
    OutsideGrid { value: f64, min: f64, max: f64 },

    /// Grid has fewer points than the search needs
    TooFewPoints { length: usize, minimum: usize },
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::OutsideGrid { value, min, max } => {
                write!(f, "{value} is outside of the grid limits [{min}, {max}]")
            }
            Error::TooFewPoints { length, minimum } => {
                write!(f, "grid has {length} points, at least {minimum} required")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let outside = Error::OutsideGrid {
            value: 3.0,
            min: 0.0,
            max: 2.0,
        };
        assert_eq!(outside.to_string(), "3 is outside of the grid limits [0, 2]");

        let too_few = Error::TooFewPoints {
            length: 1,
            minimum: 2,
        };
        assert_eq!(too_few.to_string(), "grid has 1 points, at least 2 required");
    }
}
