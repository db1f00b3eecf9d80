//! Adaptive grid generation for tabulated data
//!
//! Tabulated cross sections are only as good as the grid they are evaluated
//! on. This crate builds grids adaptively, bisecting intervals until an
//! interpolation policy reproduces the exact function to a given tolerance.
//!
//! - [GridGenerator] refines one dimensional grids
//! - [UnionGrid] combines grids refined for several functions
//! - [TwoDGridGenerator] refines a primary grid together with a secondary
//!   grid at every primary point
//!
//! ## Convergence
//!
//! An interval is accepted once the relative error at its midpoint is within
//! the convergence tolerance of the [ConvergenceCriteria]. Intervals may also
//! be accepted early when the bounds get too close together, or the absolute
//! difference gets too small. This is *dirty* convergence, which is logged as
//! a warning and reported through [Convergence::DirtyConverged], or returned
//! as an error when the generator is strict.
//!
//! ```rust
//! # use xsgrid_grid::{Convergence, ConvergenceCriteria, GridGenerator};
//! # use xsgrid_interp::InterpPolicy;
//! let criteria = ConvergenceCriteria::new(1e-3, 1e-12, 1e-14).unwrap();
//! let generator = GridGenerator::new(InterpPolicy::LOG_LOG, criteria)
//!     .unwrap()
//!     .with_strict(true);
//!
//! // power laws are exact on log-log axes
//! let refined = generator
//!     .generate_and_evaluate(&[1e-3, 1e5], |x| x.powf(-1.5))
//!     .unwrap();
//!
//! assert_eq!(refined.grid, vec![1e-3, 1e5]);
//! assert_eq!(refined.status, Convergence::Converged);
//! ```

// Modules
mod criteria;
mod error;
mod generator;
mod two_d;
mod union;

// Re-exports of anything important with in-lined documentation for simplicity
#[doc(inline)]
pub use criteria::ConvergenceCriteria;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use generator::{Bin, Convergence, GridGenerator, Refined, DEFAULT_MAX_REFINEMENTS};

#[doc(inline)]
pub use two_d::{SecondaryGridInitializer, TwoDGrid, TwoDGridGenerator};

#[doc(inline)]
pub use union::UnionGrid;
