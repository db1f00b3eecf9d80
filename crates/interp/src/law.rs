//! Transform laws applied to a single axis

// external crates
use serde::{Deserialize, Serialize};

// internal modules
use crate::error::{Error, Result};

/// Transform applied to one axis before linear interpolation
///
/// Every interpolation in this crate is linear in *processed* space. The law
/// decides what processed means for an axis:
///
/// - `Lin` is the identity
/// - `Log` is the natural logarithm, valid for strictly positive values
///
/// ```rust
/// # use xsgrid_interp::Law;
/// assert_eq!(Law::Lin.process(2.0), 2.0);
/// assert_eq!(Law::Log.process(1.0), 0.0);
/// assert_eq!(Law::Log.recover(0.0), 1.0);
/// ```
///
/// The `FromStr` trait is implemented for the usual names, ignoring case.
///
/// ```rust
/// # use xsgrid_interp::Law;
/// # use std::str::FromStr;
/// assert_eq!(Law::from_str("log").unwrap(), Law::Log);
/// assert_eq!(Law::from_str("Lin").unwrap(), Law::Lin);
/// assert!(Law::from_str("cubic").is_err());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Law {
    /// Linear axis, identity transform
    Lin,
    /// Logarithmic axis, natural log transform
    Log,
}

impl Law {
    /// Transform a raw value into processed space
    #[inline]
    pub fn process(self, value: f64) -> f64 {
        match self {
            Law::Lin => value,
            Law::Log => value.ln(),
        }
    }

    /// Transform a processed value back into raw space
    #[inline]
    pub fn recover(self, processed: f64) -> f64 {
        match self {
            Law::Lin => processed,
            Law::Log => processed.exp(),
        }
    }

    /// Valid range for an independent variable on this axis
    ///
    /// ```rust
    /// # use xsgrid_interp::Law;
    /// assert!(Law::Lin.is_indep_var_in_valid_range(-1.0));
    /// assert!(!Law::Log.is_indep_var_in_valid_range(0.0));
    /// ```
    pub fn is_indep_var_in_valid_range(self, value: f64) -> bool {
        match self {
            Law::Lin => value.is_finite(),
            Law::Log => value.is_finite() && value > 0.0,
        }
    }

    /// Valid range for a dependent variable on this axis
    ///
    /// A dependent value of exactly zero is allowed on a `Log` axis. It maps
    /// to negative infinity when processed and any interpolation touching it
    /// recovers exactly zero.
    ///
    /// ```rust
    /// # use xsgrid_interp::Law;
    /// assert!(Law::Log.is_dep_var_in_valid_range(0.0));
    /// assert!(!Law::Log.is_dep_var_in_valid_range(-1.0));
    /// assert_eq!(Law::Log.recover(Law::Log.process(0.0)), 0.0);
    /// ```
    pub fn is_dep_var_in_valid_range(self, value: f64) -> bool {
        match self {
            Law::Lin => value.is_finite(),
            Law::Log => value.is_finite() && value >= 0.0,
        }
    }

    /// Error out early on values the law is undefined for
    pub fn check_indep(self, value: f64) -> Result<f64> {
        if self.is_indep_var_in_valid_range(value) {
            Ok(value)
        } else {
            Err(Error::InvalidValue { law: self, value })
        }
    }

    /// Error out early on dependent values the law is undefined for
    pub fn check_dep(self, value: f64) -> Result<f64> {
        if self.is_dep_var_in_valid_range(value) {
            Ok(value)
        } else {
            Err(Error::InvalidValue { law: self, value })
        }
    }

    /// Display name of the law, as used in policy names
    pub fn name(self) -> &'static str {
        match self {
            Law::Lin => "Lin",
            Law::Log => "Log",
        }
    }
}

impl std::str::FromStr for Law {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lin" | "linear" => Ok(Law::Lin),
            "log" | "logarithmic" => Ok(Law::Log),
            _ => Err(Error::CouldNotInferPolicy {
                hint: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Law {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        for x in [1e-12, 1e-3, 0.5, 1.0, 7.3, 1e5] {
            for law in [Law::Lin, Law::Log] {
                let recovered = law.recover(law.process(x));
                assert!(((recovered - x) / x).abs() <= 1e-12);
            }
        }
    }

    #[test]
    fn checked_values() {
        assert_eq!(Law::Log.check_indep(2.0), Ok(2.0));
        assert_eq!(
            Law::Log.check_indep(-2.0),
            Err(Error::InvalidValue {
                law: Law::Log,
                value: -2.0
            })
        );
        assert!(Law::Lin.check_dep(f64::NAN).is_err());
        assert!(Law::Lin.check_indep(-2.0).is_ok());
    }
}
