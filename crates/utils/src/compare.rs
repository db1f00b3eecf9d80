//! Float comparisons shared by the grid convergence checks

/// Relative difference of `value` from a `reference`
///
/// A zero reference falls back to the magnitude of `value`, so that two zeros
/// compare as identical rather than producing `NaN`.
///
/// ```rust
/// # use xsgrid_utils::relative_error;
/// assert_eq!(relative_error(2.0, 1.0), 0.5);
/// assert_eq!(relative_error(-2.0, -3.0), 0.5);
/// assert_eq!(relative_error(0.0, 0.0), 0.0);
/// assert_eq!(relative_error(0.0, 1e-3), 1e-3);
/// ```
pub fn relative_error(reference: f64, value: f64) -> f64 {
    if reference != 0.0 {
        (reference - value).abs() / reference.abs()
    } else {
        value.abs()
    }
}

/// Absolute distance between two values
///
/// ```rust
/// # use xsgrid_utils::absolute_difference;
/// assert_eq!(absolute_difference(1.0, 3.0), 2.0);
/// assert_eq!(absolute_difference(3.0, 1.0), 2.0);
/// ```
pub fn absolute_difference(a: f64, b: f64) -> f64 {
    (a - b).abs()
}
