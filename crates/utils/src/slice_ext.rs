use crate::error::{Error, Result};

/// Searches and ordering checks on sorted float grids
pub trait SliceExt<T> {
    /// Check that every value is strictly greater than the one before it
    ///
    /// Empty and single value slices are trivially ascending. Any `NAN` breaks
    /// the ordering.
    ///
    /// ```rust
    /// # use xsgrid_utils::SliceExt;
    /// assert!([1e-3, 1e-2, 1.0].is_strictly_ascending());
    /// assert!(![1e-3, 1e-3, 1.0].is_strictly_ascending());
    /// assert!(![1.0, f64::NAN].is_strictly_ascending());
    /// ```
    fn is_strictly_ascending(&self) -> bool;

    /// Index of the interval `[grid[i], grid[i + 1])` containing `value`
    ///
    /// This is the lower bound search used to pick the interpolation interval
    /// on a tabulated grid. A value on an interior grid point belongs to the
    /// interval above it, and the last grid point belongs to the last
    /// interval.
    ///
    /// ```text
    ///     grid:  0.0  0.1  1.0  20.0
    ///     0.0 <= 0 <  0.1
    ///     0.1 <= 1 <  1.0
    ///     1.0 <= 2 <= 20.0
    /// ```
    ///
    /// ```rust
    /// # use xsgrid_utils::{Error, SliceExt};
    /// let grid = vec![0.0, 0.1, 1.0, 20.0];
    ///
    /// assert_eq!(grid.find_bin_exclusive(0.0), Ok(0));
    /// assert_eq!(grid.find_bin_exclusive(0.5), Ok(1));
    /// assert_eq!(grid.find_bin_exclusive(1.0), Ok(2));
    /// assert_eq!(grid.find_bin_exclusive(20.0), Ok(2));
    ///
    /// assert_eq!(
    ///     grid.find_bin_exclusive(21.0),
    ///     Err(Error::OutsideGrid { value: 21.0, min: 0.0, max: 20.0 })
    /// );
    /// ```
    fn find_bin_exclusive(&self, value: T) -> Result<usize>;
}

impl SliceExt<f64> for [f64] {
    fn is_strictly_ascending(&self) -> bool {
        self.windows(2).all(|w| w[0] < w[1])
    }

    fn find_bin_exclusive(&self, value: f64) -> Result<usize> {
        let (Some(min), Some(max), true) = (self.first(), self.last(), self.len() >= 2) else {
            return Err(Error::TooFewPoints {
                length: self.len(),
                minimum: 2,
            });
        };

        // comparisons with NAN are all false, so check it explicitly
        if value.is_nan() || value < *min || value > *max {
            return Err(Error::OutsideGrid {
                value,
                min: *min,
                max: *max,
            });
        }

        // the last point closes the final interval
        if value == *max {
            return Ok(self.len() - 2);
        }

        Ok(self.partition_point(|point| *point <= value) - 1)
    }
}
