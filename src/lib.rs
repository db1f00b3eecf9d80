//! `xsgrid` is a modular toolkit for building and evaluating tabulated cross
//! section data
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use xsgrid_utils as utils;

#[cfg(feature = "interp")]
#[cfg_attr(docsrs, doc(cfg(feature = "interp")))]
#[doc(inline)]
pub use xsgrid_interp as interp;

#[cfg(feature = "grid")]
#[cfg_attr(docsrs, doc(cfg(feature = "grid")))]
#[doc(inline)]
pub use xsgrid_grid as grid;

#[cfg(feature = "datagen")]
#[cfg_attr(docsrs, doc(cfg(feature = "datagen")))]
#[doc(inline)]
pub use xsgrid_datagen as datagen;
