//! Common utility for extended `std` types
//!
//! These are left public for convenience.
//!
//! Searching sorted grids, comparing floats with a relative tolerance, and
//! prettier scientific formatting for log messages are useful everywhere.

// Alias for the format! macro
pub use std::format as f;

// Modules
mod compare;
mod error;
mod slice_ext;
mod value_ext;

// Flatten
pub use compare::{absolute_difference, relative_error};
pub use error::{Error, Result};
pub use slice_ext::SliceExt;
pub use value_ext::ValueExt;
