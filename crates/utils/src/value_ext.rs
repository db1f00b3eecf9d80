use crate::f;

/// Fixed width scientific formatting for log messages
pub trait ValueExt {
    /// Scientific notation with a signed, zero padded exponent
    ///
    /// Grid points and tolerances in log messages all go through this so that
    /// columns of values line up.
    ///
    /// ```rust
    /// # use xsgrid_utils::ValueExt;
    /// assert_eq!((-1.0_f64).sci(5, 2), "-1.00000e+00");
    /// assert_eq!(1.0e-7_f64.sci(3, 2), "1.000e-07");
    /// assert_eq!(20.2_f64.sci(2, 3), "2.02e+001");
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: std::fmt::LowerExp> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let formatted = f!("{self:.precision$e}");

        let Some((mantissa, exponent)) = formatted.split_once('e') else {
            return formatted;
        };

        match exponent.strip_prefix('-') {
            Some(magnitude) => f!("{mantissa}e-{magnitude:0>exp_pad$}"),
            None => f!("{mantissa}e+{exponent:0>exp_pad$}"),
        }
    }
}
