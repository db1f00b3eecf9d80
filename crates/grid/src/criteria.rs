// external crates
use serde::{Deserialize, Serialize};

// internal modules
use crate::error::{Error, Result};

/// Tolerances deciding when an interval of a grid has converged
///
/// - `convergence_tol` - relative error allowed between the interpolated and
///   exact value at the midpoint of an interval, in (0, 1]
/// - `absolute_diff_tol` - absolute difference below which an interval is
///   accepted even if the relative error is too large, in [0, 1]
/// - `distance_tol` - relative distance between interval bounds below which
///   an interval is accepted even if the relative error is too large, in
///   [0, 1]
///
/// Acceptance through either of the last two is *dirty* convergence.
///
/// ```rust
/// # use xsgrid_grid::ConvergenceCriteria;
/// let criteria = ConvergenceCriteria::default();
/// assert_eq!(criteria.convergence_tol, 1e-3);
/// assert_eq!(criteria.absolute_diff_tol, 1e-12);
/// assert_eq!(criteria.distance_tol, 1e-14);
///
/// // out of range tolerances are rejected
/// assert!(ConvergenceCriteria::new(0.0, 1e-12, 1e-14).is_err());
/// assert!(ConvergenceCriteria::new(1e-3, 2.0, 1e-14).is_err());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceCriteria {
    pub convergence_tol: f64,
    pub absolute_diff_tol: f64,
    pub distance_tol: f64,
}

impl ConvergenceCriteria {
    /// Create a new set of validated tolerances
    pub fn new(convergence_tol: f64, absolute_diff_tol: f64, distance_tol: f64) -> Result<Self> {
        let criteria = Self {
            convergence_tol,
            absolute_diff_tol,
            distance_tol,
        };
        criteria.validate()?;
        Ok(criteria)
    }

    /// Check every tolerance is in its valid range
    ///
    /// Fields are public for convenience, so anything consuming criteria
    /// re-validates them.
    pub fn validate(&self) -> Result<()> {
        if !(self.convergence_tol > 0.0 && self.convergence_tol <= 1.0) {
            return Err(Error::InvalidTolerance {
                name: "convergence_tol",
                value: self.convergence_tol,
                range: "(0, 1]",
            });
        }

        for (name, value) in [
            ("absolute_diff_tol", self.absolute_diff_tol),
            ("distance_tol", self.distance_tol),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidTolerance {
                    name,
                    value,
                    range: "[0, 1]",
                });
            }
        }

        Ok(())
    }
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self {
            convergence_tol: 1e-3,
            absolute_diff_tol: 1e-12,
            distance_tol: 1e-14,
        }
    }
}
