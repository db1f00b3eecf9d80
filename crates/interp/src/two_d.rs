//! Two dimensional interpolation policies
//!
//! A two dimensional policy combines a law for each of the dependent variable
//! z, the secondary independent variable y, and the primary independent
//! variable x. Tabulated data is a stack of (y, z) grids, one per primary
//! grid point.

// external crates
use serde::{Deserialize, Serialize};

// xsgrid modules
use xsgrid_utils::{relative_error, SliceExt};

// internal modules
use crate::error::{Error, Result};
use crate::law::Law;
use crate::policy::{check_lengths, linear, split_laws, InterpPolicy, UNIT_BASE_TOL};

/// A secondary (y, z) grid tabulated at a single primary value
///
/// ```rust
/// # use xsgrid_interp::TabulatedGrid;
/// let grid = TabulatedGrid::new(&[1e-3, 1e-2, 1.0], &[1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(grid.min(), 1e-3);
/// assert_eq!(grid.max(), 1.0);
///
/// // grids must pair up and have a lower and upper bound
/// assert!(TabulatedGrid::new(&[1e-3, 1e-2], &[1.0]).is_err());
/// assert!(TabulatedGrid::new(&[1e-3], &[1.0]).is_err());
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TabulatedGrid<'a> {
    y: &'a [f64],
    z: &'a [f64],
}

impl<'a> TabulatedGrid<'a> {
    /// Pair up a secondary grid with its dependent values
    pub fn new(y: &'a [f64], z: &'a [f64]) -> Result<Self> {
        check_lengths(y, z, 2)?;
        Ok(Self { y, z })
    }

    /// Secondary grid values
    pub fn y(&self) -> &'a [f64] {
        self.y
    }

    /// Dependent values
    pub fn z(&self) -> &'a [f64] {
        self.z
    }

    /// Lower bound of the secondary grid
    pub fn min(&self) -> f64 {
        self.y[0]
    }

    /// Upper bound of the secondary grid
    pub fn max(&self) -> f64 {
        self.y[self.y.len() - 1]
    }
}

/// Two dimensional interpolation policy, named Z-Y-X
///
/// `LIN_LOG_LOG` is linear in the dependent variable z, logarithmic in the
/// secondary variable y, and logarithmic in the primary variable x. The
/// derived one dimensional policies are
///
/// | Policy      | Dependent | Independent |
/// |-------------|-----------|-------------|
/// | `zy()`      | z         | y           |
/// | `zx()`      | z         | x           |
/// | `ymin_x()`  | y         | x           |
/// | `lx()`      | Lin       | x           |
///
/// The `FromStr` trait is implemented so that policies can be selected by
/// name, e.g. from configuration files.
///
/// ```rust
/// # use xsgrid_interp::{TwoDPolicy, InterpPolicy};
/// let policy: TwoDPolicy = "LinLogLog".parse().unwrap();
/// assert_eq!(policy, TwoDPolicy::LIN_LOG_LOG);
/// assert_eq!(policy.zy(), InterpPolicy::LIN_LOG);
/// assert_eq!(policy.ymin_x(), InterpPolicy::LOG_LOG);
/// assert_eq!(policy.to_string(), "LinLogLog");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TwoDPolicy {
    /// Law applied to the dependent variable z
    pub dep: Law,
    /// Law applied to the secondary independent variable y
    pub second: Law,
    /// Law applied to the primary independent variable x
    pub first: Law,
}

impl TwoDPolicy {
    pub const LIN_LIN_LIN: Self = Self::new(Law::Lin, Law::Lin, Law::Lin);
    pub const LIN_LIN_LOG: Self = Self::new(Law::Lin, Law::Lin, Law::Log);
    pub const LIN_LOG_LIN: Self = Self::new(Law::Lin, Law::Log, Law::Lin);
    pub const LIN_LOG_LOG: Self = Self::new(Law::Lin, Law::Log, Law::Log);
    pub const LOG_LIN_LIN: Self = Self::new(Law::Log, Law::Lin, Law::Lin);
    pub const LOG_LIN_LOG: Self = Self::new(Law::Log, Law::Lin, Law::Log);
    pub const LOG_LOG_LIN: Self = Self::new(Law::Log, Law::Log, Law::Lin);
    pub const LOG_LOG_LOG: Self = Self::new(Law::Log, Law::Log, Law::Log);

    /// Lookup table of every combination
    pub const ALL: [Self; 8] = [
        Self::LIN_LIN_LIN,
        Self::LIN_LIN_LOG,
        Self::LIN_LOG_LIN,
        Self::LIN_LOG_LOG,
        Self::LOG_LIN_LIN,
        Self::LOG_LIN_LOG,
        Self::LOG_LOG_LIN,
        Self::LOG_LOG_LOG,
    ];

    /// Create a policy from the z, y, and x laws
    pub const fn new(dep: Law, second: Law, first: Law) -> Self {
        Self { dep, second, first }
    }

    /// Display name, e.g. "LogLinLog"
    pub fn name(&self) -> String {
        format!("{}{}{}", self.dep, self.second, self.first)
    }

    /// Policy for interpolating z along a secondary grid
    pub const fn zy(&self) -> InterpPolicy {
        InterpPolicy::new(self.dep, self.second)
    }

    /// Policy for interpolating z between primary grid points
    pub const fn zx(&self) -> InterpPolicy {
        InterpPolicy::new(self.dep, self.first)
    }

    /// Policy for interpolating secondary grid limits between primary points
    pub const fn ymin_x(&self) -> InterpPolicy {
        InterpPolicy::new(self.second, self.first)
    }

    /// Policy for interpolating secondary grid lengths between primary points
    pub const fn lx(&self) -> InterpPolicy {
        InterpPolicy::new(Law::Lin, self.first)
    }

    #[inline]
    pub fn process_first_indep_var(&self, x: f64) -> f64 {
        self.first.process(x)
    }

    #[inline]
    pub fn recover_processed_first_indep_var(&self, processed_x: f64) -> f64 {
        self.first.recover(processed_x)
    }

    #[inline]
    pub fn process_second_indep_var(&self, y: f64) -> f64 {
        self.second.process(y)
    }

    #[inline]
    pub fn recover_processed_second_indep_var(&self, processed_y: f64) -> f64 {
        self.second.recover(processed_y)
    }

    #[inline]
    pub fn process_dep_var(&self, z: f64) -> f64 {
        self.dep.process(z)
    }

    #[inline]
    pub fn recover_processed_dep_var(&self, processed_z: f64) -> f64 {
        self.dep.recover(processed_z)
    }

    /// Interpolate z at (x, y) directly on both secondary grids
    ///
    /// Both grids are interpolated at the same `y`, so `y` must be covered by
    /// both of them. Use [TwoDPolicy::interpolate_unit_base] for grids with
    /// different supports.
    pub fn interpolate(
        &self,
        x0: f64,
        x1: f64,
        x: f64,
        y: f64,
        grid_0: &TabulatedGrid,
        grid_1: &TabulatedGrid,
    ) -> Result<f64> {
        check_primary(x0, x1, x)?;
        self.interpolate_processed(
            self.process_first_indep_var(x0),
            self.process_first_indep_var(x1),
            self.process_first_indep_var(x),
            y,
            grid_0,
            grid_1,
        )
    }

    /// See [TwoDPolicy::interpolate], with processed primary values
    pub fn interpolate_processed(
        &self,
        processed_x0: f64,
        processed_x1: f64,
        processed_x: f64,
        y: f64,
        grid_0: &TabulatedGrid,
        grid_1: &TabulatedGrid,
    ) -> Result<f64> {
        let processed_z0 = self.interpolate_and_process_on_y_grid(y, grid_0)?;
        let processed_z1 = self.interpolate_and_process_on_y_grid(y, grid_1)?;

        let slope = (processed_z1 - processed_z0) / (processed_x1 - processed_x0);

        Ok(self
            .zx()
            .interpolate_processed(processed_x0, processed_x, processed_z0, slope))
    }

    /// Interpolate z at (x, y) using unit-base rescaled secondary grids
    ///
    /// Each secondary grid is mapped onto [0, 1] through its processed length
    /// before interpolating between them, which is the usual way to combine
    /// distributions tabulated on different supports. Requests outside of
    /// the unit-base range at x give zero.
    pub fn interpolate_unit_base(
        &self,
        x0: f64,
        x1: f64,
        x: f64,
        y: f64,
        grid_0: &TabulatedGrid,
        grid_1: &TabulatedGrid,
    ) -> Result<f64> {
        check_primary(x0, x1, x)?;
        self.interpolate_unit_base_processed(
            self.process_first_indep_var(x0),
            self.process_first_indep_var(x1),
            self.process_first_indep_var(x),
            y,
            grid_0,
            grid_1,
        )
    }

    /// See [TwoDPolicy::interpolate_unit_base], with processed primary values
    pub fn interpolate_unit_base_processed(
        &self,
        processed_x0: f64,
        processed_x1: f64,
        processed_x: f64,
        y: f64,
        grid_0: &TabulatedGrid,
        grid_1: &TabulatedGrid,
    ) -> Result<f64> {
        let zy = self.zy();

        // processed lengths of the grids and of the intermediate grid
        let length_0 = zy.calculate_unit_base_grid_length(grid_0.min(), grid_0.max());
        let length_1 = zy.calculate_unit_base_grid_length(grid_1.min(), grid_1.max());
        let length_x = self.calculate_intermediate_grid_length_processed(
            processed_x0,
            processed_x1,
            processed_x,
            length_0,
            length_1,
        );

        // lower limit of the intermediate grid
        let processed_y_x_min = self.calculate_intermediate_processed_grid_limit(
            processed_x0,
            processed_x1,
            processed_x,
            grid_0.min(),
            grid_1.min(),
        );

        let eta = zy.calculate_unit_base_indep_var_processed(
            self.process_second_indep_var(y),
            processed_y_x_min,
            length_x,
            UNIT_BASE_TOL,
        );

        if !(0.0..=1.0).contains(&eta) {
            return Ok(0.0);
        }

        // the same fraction along each of the grids
        let y_0 = zy.calculate_indep_var(eta, grid_0.min(), length_0, UNIT_BASE_TOL);
        let y_1 = zy.calculate_indep_var(eta, grid_1.min(), length_1, UNIT_BASE_TOL);

        let processed_z0 = self.interpolate_and_process_on_y_grid(y_0, grid_0)?;
        let processed_z1 = self.interpolate_and_process_on_y_grid(y_1, grid_1)?;

        if processed_z0 == f64::NEG_INFINITY || processed_z1 == f64::NEG_INFINITY {
            return Ok(0.0);
        }

        // interpolate the length weighted values
        let scaled_z0 = processed_z0 * length_0;
        let slope = (processed_z1 * length_1 - scaled_z0) / (processed_x1 - processed_x0);
        let processed_z = linear(processed_x0, processed_x, scaled_z0, slope) / length_x;

        Ok(self.recover_processed_dep_var(processed_z))
    }

    /// Length of the secondary grid at x, between grids of length L0 and L1
    pub fn calculate_intermediate_grid_length(
        &self,
        x0: f64,
        x1: f64,
        x: f64,
        length_0: f64,
        length_1: f64,
    ) -> f64 {
        self.calculate_intermediate_grid_length_processed(
            self.process_first_indep_var(x0),
            self.process_first_indep_var(x1),
            self.process_first_indep_var(x),
            length_0,
            length_1,
        )
    }

    /// See [TwoDPolicy::calculate_intermediate_grid_length]
    pub fn calculate_intermediate_grid_length_processed(
        &self,
        processed_x0: f64,
        processed_x1: f64,
        processed_x: f64,
        length_0: f64,
        length_1: f64,
    ) -> f64 {
        let slope = (length_1 - length_0) / (processed_x1 - processed_x0);
        self.lx()
            .interpolate_processed(processed_x0, processed_x, length_0, slope)
    }

    /// Lower limit of the secondary grid at x, between two grid limits
    pub fn calculate_intermediate_grid_limit(
        &self,
        x0: f64,
        x1: f64,
        x: f64,
        y0_min: f64,
        y1_min: f64,
    ) -> f64 {
        self.recover_processed_second_indep_var(self.calculate_intermediate_processed_grid_limit(
            self.process_first_indep_var(x0),
            self.process_first_indep_var(x1),
            self.process_first_indep_var(x),
            y0_min,
            y1_min,
        ))
    }

    /// Processed lower limit of the secondary grid at a processed x
    pub fn calculate_intermediate_processed_grid_limit(
        &self,
        processed_x0: f64,
        processed_x1: f64,
        processed_x: f64,
        y0_min: f64,
        y1_min: f64,
    ) -> f64 {
        let ymin_x = self.ymin_x();
        let processed_y0_min = ymin_x.process_dep_var(y0_min);
        let slope =
            (ymin_x.process_dep_var(y1_min) - processed_y0_min) / (processed_x1 - processed_x0);

        linear(processed_x0, processed_x, processed_y0_min, slope)
    }

    /// Processed z on a single secondary grid
    ///
    /// Values just above the last grid point, within the unit-base tolerance,
    /// take the last value, and likewise just below the first grid point.
    fn interpolate_and_process_on_y_grid(&self, y: f64, grid: &TabulatedGrid) -> Result<f64> {
        let (ys, zs) = (grid.y(), grid.z());
        let zy = self.zy();

        let last = zs.len() - 1;
        if y < grid.max() {
            if y < grid.min() {
                return match relative_error(grid.min(), y) <= UNIT_BASE_TOL {
                    true => Ok(zy.process_dep_var(zs[0])),
                    false => Err(outside(y, grid)),
                };
            }

            let i = ys.find_bin_exclusive(y)?;
            Ok(zy.interpolate_and_process(ys[i], ys[i + 1], y, zs[i], zs[i + 1]))
        } else if y == grid.max() || relative_error(grid.max(), y) <= UNIT_BASE_TOL {
            Ok(zy.process_dep_var(zs[last]))
        } else {
            Err(outside(y, grid))
        }
    }
}

impl std::str::FromStr for TwoDPolicy {
    type Err = Error;

    /// Parse names such as "LinLogLog" or "log-lin-lin"
    fn from_str(s: &str) -> Result<Self> {
        let laws = split_laws(s, 3)?;
        Ok(Self::new(laws[0], laws[1], laws[2]))
    }
}

impl std::fmt::Display for TwoDPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn check_primary(x0: f64, x1: f64, x: f64) -> Result<()> {
    if x0 < x1 && x0 <= x && x <= x1 {
        Ok(())
    } else {
        Err(Error::InvalidPrimaryBounds { x0, x1, x })
    }
}

fn outside(y: f64, grid: &TabulatedGrid) -> Error {
    Error::OutsideOfGrid {
        value: y,
        lower: grid.min(),
        upper: grid.max(),
    }
}
