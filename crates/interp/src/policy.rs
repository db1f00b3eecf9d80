//! One dimensional interpolation policies

// external crates
use serde::{Deserialize, Serialize};

// xsgrid modules
use xsgrid_utils::SliceExt;

// internal modules
use crate::error::{Error, Result};
use crate::law::Law;

/// Default relative tolerance used by the unit-base helpers
pub const UNIT_BASE_TOL: f64 = 1e-3;

/// One dimensional interpolation policy
///
/// Named dependent-first, so `LIN_LOG` is linear in y and logarithmic in x.
/// Every operation processes its arguments, interpolates linearly in processed
/// space, and recovers the result.
///
/// ```rust
/// # use xsgrid_interp::InterpPolicy;
/// let y = InterpPolicy::LIN_LIN.interpolate(0.0, 10.0, 2.5, 0.0, 1.0);
/// assert_eq!(y, 0.25);
///
/// // lin in y, log in x
/// let y = InterpPolicy::LIN_LOG.interpolate(1.0, 100.0, 10.0, 0.0, 2.0);
/// assert!((y - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterpPolicy {
    /// Law applied to the dependent variable
    pub dep: Law,
    /// Law applied to the independent variable
    pub indep: Law,
}

impl InterpPolicy {
    /// Linear in y, linear in x
    pub const LIN_LIN: Self = Self::new(Law::Lin, Law::Lin);
    /// Linear in y, logarithmic in x
    pub const LIN_LOG: Self = Self::new(Law::Lin, Law::Log);
    /// Logarithmic in y, linear in x
    pub const LOG_LIN: Self = Self::new(Law::Log, Law::Lin);
    /// Logarithmic in y, logarithmic in x
    pub const LOG_LOG: Self = Self::new(Law::Log, Law::Log);

    /// Every one dimensional policy
    pub const ALL: [Self; 4] = [Self::LIN_LIN, Self::LIN_LOG, Self::LOG_LIN, Self::LOG_LOG];

    /// Create a policy from the dependent and independent laws
    pub const fn new(dep: Law, indep: Law) -> Self {
        Self { dep, indep }
    }

    /// Display name, e.g. "LogLin"
    pub fn name(&self) -> String {
        format!("{}{}", self.dep, self.indep)
    }

    #[inline]
    pub fn process_indep_var(&self, indep_var: f64) -> f64 {
        self.indep.process(indep_var)
    }

    #[inline]
    pub fn recover_processed_indep_var(&self, processed_indep_var: f64) -> f64 {
        self.indep.recover(processed_indep_var)
    }

    #[inline]
    pub fn process_dep_var(&self, dep_var: f64) -> f64 {
        self.dep.process(dep_var)
    }

    #[inline]
    pub fn recover_processed_dep_var(&self, processed_dep_var: f64) -> f64 {
        self.dep.recover(processed_dep_var)
    }

    /// See [Law::is_indep_var_in_valid_range]
    pub fn is_indep_var_in_valid_range(&self, indep_var: f64) -> bool {
        self.indep.is_indep_var_in_valid_range(indep_var)
    }

    /// See [Law::is_dep_var_in_valid_range]
    pub fn is_dep_var_in_valid_range(&self, dep_var: f64) -> bool {
        self.dep.is_dep_var_in_valid_range(dep_var)
    }

    /// Interpolate between (x0, y0) and (x1, y1) at x
    ///
    /// Requires `x0 <= x <= x1` and values within the valid range of each
    /// axis. Interpolation towards a zero on a `Log` dependent axis gives zero.
    pub fn interpolate(&self, x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
        self.recover_processed_dep_var(self.interpolate_and_process(x0, x1, x, y0, y1))
    }

    /// Interpolate from already processed values and a processed slope
    pub fn interpolate_processed(
        &self,
        processed_x0: f64,
        processed_x: f64,
        processed_y0: f64,
        processed_slope: f64,
    ) -> f64 {
        self.recover_processed_dep_var(linear(
            processed_x0,
            processed_x,
            processed_y0,
            processed_slope,
        ))
    }

    /// Same as [InterpPolicy::interpolate] but leaves the result processed
    pub fn interpolate_and_process(&self, x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
        let processed_x0 = self.process_indep_var(x0);
        let processed_y0 = self.process_dep_var(y0);
        let processed_slope = (self.process_dep_var(y1) - processed_y0)
            / (self.process_indep_var(x1) - processed_x0);

        linear(
            processed_x0,
            self.process_indep_var(x),
            processed_y0,
            processed_slope,
        )
    }

    /// Processed length of the independent grid [min, max]
    pub fn calculate_unit_base_grid_length(&self, grid_min: f64, grid_max: f64) -> f64 {
        self.process_indep_var(grid_max) - self.process_indep_var(grid_min)
    }

    /// Fraction `eta` of the way along a grid of processed length `L`
    ///
    /// Values within `tol` outside of [0, 1] are clamped onto the boundary.
    pub fn calculate_unit_base_indep_var(
        &self,
        indep_var: f64,
        indep_var_min: f64,
        indep_grid_length: f64,
        tol: f64,
    ) -> f64 {
        self.calculate_unit_base_indep_var_processed(
            self.process_indep_var(indep_var),
            self.process_indep_var(indep_var_min),
            indep_grid_length,
            tol,
        )
    }

    /// See [InterpPolicy::calculate_unit_base_indep_var]
    pub fn calculate_unit_base_indep_var_processed(
        &self,
        processed_indep_var: f64,
        processed_indep_var_min: f64,
        indep_grid_length: f64,
        tol: f64,
    ) -> f64 {
        let eta = (processed_indep_var - processed_indep_var_min) / indep_grid_length;

        if eta > 1.0 && eta - 1.0 <= tol {
            1.0
        } else if eta < 0.0 && eta >= -tol {
            0.0
        } else {
            eta
        }
    }

    /// Raw independent value at a fraction `eta` of the way along a grid
    ///
    /// Round-off that lands just below the grid minimum is snapped back onto
    /// the minimum.
    pub fn calculate_indep_var(
        &self,
        eta: f64,
        indep_var_min: f64,
        indep_grid_length: f64,
        tol: f64,
    ) -> f64 {
        let grid_indep_var = self.recover_processed_indep_var(self.calculate_processed_indep_var(
            eta,
            self.process_indep_var(indep_var_min),
            indep_grid_length,
        ));

        if grid_indep_var < indep_var_min
            && grid_indep_var >= calculate_fuzzy_lower_bound(indep_var_min, tol)
        {
            indep_var_min
        } else {
            grid_indep_var
        }
    }

    /// Processed independent value at a fraction `eta` of the way along a grid
    pub fn calculate_processed_indep_var(
        &self,
        eta: f64,
        processed_indep_var_min: f64,
        indep_grid_length: f64,
    ) -> f64 {
        processed_indep_var_min + indep_grid_length * eta
    }

    /// Evaluate a tabulated function at `x`
    ///
    /// Uses a lower bound search for the interval. A value exactly on the last
    /// grid point returns the last dependent value.
    ///
    /// ```rust
    /// # use xsgrid_interp::InterpPolicy;
    /// let grid = [1.0, 2.0, 4.0];
    /// let values = [10.0, 20.0, 0.0];
    ///
    /// let policy = InterpPolicy::LIN_LIN;
    /// assert_eq!(policy.evaluate_on_grid(&grid, &values, 3.0).unwrap(), 10.0);
    /// assert_eq!(policy.evaluate_on_grid(&grid, &values, 4.0).unwrap(), 0.0);
    /// assert!(policy.evaluate_on_grid(&grid, &values, 5.0).is_err());
    /// ```
    pub fn evaluate_on_grid(&self, grid: &[f64], values: &[f64], x: f64) -> Result<f64> {
        check_lengths(grid, values, 1)?;

        // single point grids only know about their own point
        if grid.len() == 1 {
            if x == grid[0] {
                return Ok(values[0]);
            }
            return Err(Error::OutsideOfGrid {
                value: x,
                lower: grid[0],
                upper: grid[0],
            });
        }

        let i = grid.find_bin_exclusive(x)?;
        if x == grid[i + 1] {
            return Ok(values[i + 1]);
        }

        Ok(self.interpolate(grid[i], grid[i + 1], x, values[i], values[i + 1]))
    }
}

impl std::str::FromStr for InterpPolicy {
    type Err = Error;

    /// Parse names such as "LinLog" or "log-log"
    fn from_str(s: &str) -> Result<Self> {
        let laws = split_laws(s, 2)?;
        Ok(Self::new(laws[0], laws[1]))
    }
}

impl std::fmt::Display for InterpPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lower bound of `value` relaxed by a relative tolerance
///
/// ```rust
/// # use xsgrid_interp::calculate_fuzzy_lower_bound;
/// assert_eq!(calculate_fuzzy_lower_bound(10.0, 0.1), 9.0);
/// assert_eq!(calculate_fuzzy_lower_bound(-10.0, 0.1), -11.0);
/// ```
pub fn calculate_fuzzy_lower_bound(value: f64, tol: f64) -> f64 {
    if value < 0.0 {
        value * (1.0 + tol)
    } else {
        value * (1.0 - tol)
    }
}

/// Upper bound of `value` relaxed by a relative tolerance
///
/// ```rust
/// # use xsgrid_interp::calculate_fuzzy_upper_bound;
/// assert_eq!(calculate_fuzzy_upper_bound(10.0, 0.1), 11.0);
/// assert_eq!(calculate_fuzzy_upper_bound(-10.0, 0.1), -9.0);
/// ```
pub fn calculate_fuzzy_upper_bound(value: f64, tol: f64) -> f64 {
    if value > 0.0 {
        value * (1.0 + tol)
    } else {
        value * (1.0 - tol)
    }
}

/// Straight line in processed space
///
/// A processed zero on a log axis is negative infinity, either directly or
/// through an infinite slope, and it owns the whole interval.
#[inline]
pub(crate) fn linear(processed_x0: f64, processed_x: f64, processed_y0: f64, slope: f64) -> f64 {
    if processed_x == processed_x0 {
        processed_y0
    } else if processed_y0 == f64::NEG_INFINITY || slope.is_infinite() {
        f64::NEG_INFINITY
    } else {
        processed_y0 + slope * (processed_x - processed_x0)
    }
}

/// Check that a tabulated grid pairs up and has enough points
pub(crate) fn check_lengths(indep: &[f64], dep: &[f64], required: usize) -> Result<()> {
    if indep.len() != dep.len() {
        return Err(Error::MismatchedLengths {
            indep: indep.len(),
            dep: dep.len(),
        });
    }

    if indep.len() < required {
        return Err(Error::TooFewPoints {
            found: indep.len(),
            required,
        });
    }

    Ok(())
}

/// Split a policy name into its laws, e.g. "LinLogLog" or "lin-log-log"
pub(crate) fn split_laws(s: &str, n: usize) -> Result<Vec<Law>> {
    let err = || Error::CouldNotInferPolicy {
        hint: s.to_string(),
    };

    let compact: String = s
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect();

    if compact.len() != 3 * n || !compact.is_ascii() {
        return Err(err());
    }

    (0..n)
        .map(|i| compact[3 * i..3 * (i + 1)].parse::<Law>().map_err(|_| err()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn named_interpolation() {
        // closed forms for each of the laws
        let (x0, x1, x, y0, y1): (f64, f64, f64, f64, f64) = (1.0, 10.0, 3.0, 2.0, 20.0);

        let lin_lin = y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        let lin_log = y0 + (y1 - y0) * (x / x0).ln() / (x1 / x0).ln();
        let log_lin = y0 * (y1 / y0).powf((x - x0) / (x1 - x0));
        let log_log = y0 * (y1 / y0).powf((x / x0).ln() / (x1 / x0).ln());

        let p = InterpPolicy::LIN_LIN;
        assert_relative_eq!(p.interpolate(x0, x1, x, y0, y1), lin_lin, epsilon = 1e-12);
        let p = InterpPolicy::LIN_LOG;
        assert_relative_eq!(p.interpolate(x0, x1, x, y0, y1), lin_log, epsilon = 1e-12);
        let p = InterpPolicy::LOG_LIN;
        assert_relative_eq!(p.interpolate(x0, x1, x, y0, y1), log_lin, epsilon = 1e-12);
        let p = InterpPolicy::LOG_LOG;
        assert_relative_eq!(p.interpolate(x0, x1, x, y0, y1), log_log, epsilon = 1e-12);
    }

    #[test]
    fn zero_on_log_axis() {
        let p = InterpPolicy::LOG_LOG;
        assert_eq!(p.interpolate(1.0, 2.0, 1.5, 0.0, 1.0), 0.0);
        assert_eq!(p.interpolate(1.0, 2.0, 1.5, 1.0, 0.0), 0.0);

        // the end points still belong to themselves
        assert_relative_eq!(p.interpolate(1.0, 2.0, 1.0, 3.0, 0.0), 3.0, epsilon = 1e-14);
    }

    #[test]
    fn unit_base_clamping() {
        let p = InterpPolicy::LIN_LIN;
        assert_eq!(p.calculate_unit_base_indep_var(10.0005, 0.0, 10.0, 1e-3), 1.0);
        assert_eq!(p.calculate_unit_base_indep_var(-0.005, 0.0, 10.0, 1e-3), 0.0);
        assert_eq!(p.calculate_unit_base_indep_var(5.0, 0.0, 10.0, 1e-3), 0.5);
        assert!(p.calculate_unit_base_indep_var(11.0, 0.0, 10.0, 1e-3) > 1.0);
    }

    #[test]
    fn indep_var_snaps_to_min() {
        let p = InterpPolicy::LOG_LOG;
        let length = p.calculate_unit_base_grid_length(1e-3, 1.0);

        let y = p.calculate_indep_var(0.0, 1e-3, length, UNIT_BASE_TOL);
        assert!(y >= 1e-3);
        assert_relative_eq!(y, 1e-3, epsilon = 1e-15);

        let y = p.calculate_indep_var(1.0, 1e-3, length, UNIT_BASE_TOL);
        assert_relative_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn names() {
        for policy in InterpPolicy::ALL {
            assert_eq!(policy.name().parse::<InterpPolicy>().unwrap(), policy);
        }
        assert_eq!("log-lin".parse::<InterpPolicy>().unwrap(), InterpPolicy::LOG_LIN);
        assert!("LinLogLog".parse::<InterpPolicy>().is_err());
        assert!("Lan".parse::<InterpPolicy>().is_err());
    }

    #[test]
    fn grid_evaluation() {
        let grid = [1e-3, 1e-2, 1e-1, 1.0];
        let values = [0.0, 1.0, 2.0, 3.0];
        let p = InterpPolicy::LIN_LOG;

        assert_eq!(p.evaluate_on_grid(&grid, &values, 1e-3).unwrap(), 0.0);
        assert_eq!(p.evaluate_on_grid(&grid, &values, 1.0).unwrap(), 3.0);
        assert_relative_eq!(
            p.evaluate_on_grid(&grid, &values, 0.05).unwrap(),
            1.0 + 5.0_f64.log10(),
            epsilon = 1e-12
        );
        assert!(matches!(
            p.evaluate_on_grid(&grid, &values[1..], 0.5),
            Err(Error::MismatchedLengths { .. })
        ));
    }
}
