//! Interpolation policies for tabulated cross-section data
//!
//! Every interpolation is linear in *processed* space, where each axis is
//! transformed by its [Law] before interpolating and recovered afterwards.
//!
//! - [InterpPolicy] covers the four one dimensional combinations
//! - [TwoDPolicy] covers the eight two dimensional combinations
//!
//! Policies are plain `Copy` values, so they are cheap to pass around and
//! every operation is a pure function of its arguments.
//!
//! ## Processed variants
//!
//! Most operations come in two flavours. The plain variant takes raw values
//! and the `_processed` variant takes values that have already been through
//! the relevant law. The plain variant always transforms its arguments and
//! calls the processed one, so both give bit-identical results.
//!
//! ## Two dimensional data
//!
//! Tabulated two dimensional data is a stack of secondary (y, z) grids, one
//! for each primary grid point x. Between two primary points the value can
//! be found either directly, interpolating both grids at the same y, or on a
//! unit base, where each grid is first mapped onto [0, 1].
//!
//! ```rust
//! # use xsgrid_interp::{TabulatedGrid, TwoDPolicy};
//! let (y0, z0) = ([1e-3, 1e-2, 1e-1, 1.0], [0.0, 1.0, 2.0, 3.0]);
//! let (y1, z1) = ([1e-2, 1e-1, 1.0], [1.0, 2.0, 3.0]);
//!
//! let grid_0 = TabulatedGrid::new(&y0, &z0).unwrap();
//! let grid_1 = TabulatedGrid::new(&y1, &z1).unwrap();
//!
//! let policy = TwoDPolicy::LIN_LOG_LOG;
//! let z = policy
//!     .interpolate_unit_base(0.1, 1.0, 0.3, 0.05, &grid_0, &grid_1)
//!     .unwrap();
//!
//! assert!((z - 1.6479753906804104).abs() < 1e-12);
//! ```

// Modules
mod error;
mod law;
mod policy;
mod two_d;

// Re-exports of anything important with in-lined documentation for simplicity
#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use law::Law;

#[doc(inline)]
pub use policy::{
    calculate_fuzzy_lower_bound, calculate_fuzzy_upper_bound, InterpPolicy, UNIT_BASE_TOL,
};

#[doc(inline)]
pub use two_d::{TabulatedGrid, TwoDPolicy};
