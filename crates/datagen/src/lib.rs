//! Adjoint cross section data generation
//!
//! Builds adjoint electron-photon data from forward data on a shared union
//! energy grid.
//!
//! - [AdjointDataGenerator] drives a full run, from the union grid to every
//!   registered cross section and distribution
//! - [TwoVariableGridGenerator] builds secondary grids between the kinematic
//!   [Boundaries] of a distribution
//! - [ForwardData] and [AdjointData] abstract over the data containers, with
//!   [ForwardTable] and [AdjointTable] as in-memory JSON implementations
//!
//! Nothing is persisted unless every quantity succeeds. A failure is reported
//! as [Error::Quantity] with the name of the quantity that failed.
//!
//! ## Configuration
//!
//! A [GeneratorConfig] holds the energy limits and default tolerances, with
//! per-quantity overrides. It is usually read from JSON.
//!
//! ```rust
//! # use xsgrid_datagen::{GeneratorConfig, Quantity};
//! let config: GeneratorConfig = serde_json::from_str(
//!     r#"{
//!         "min_energy": 1e-5,
//!         "max_energy": 20.0,
//!         "strict": true,
//!         "defaults": { "evaluation_tol": 1e-6, "nudge_value": 1e-9 }
//!     }"#,
//! )
//! .unwrap();
//!
//! let bremsstrahlung = config.quantity(&Quantity::Bremsstrahlung);
//! assert_eq!(bremsstrahlung.evaluation_tol, 1e-6);
//! assert_eq!(bremsstrahlung.grid_convergence_tol, 1e-3);
//! ```

// Modules
mod config;
mod container;
mod driver;
mod error;
mod quantity;
mod tabular;
mod two_variable;

// Re-exports of anything important with in-lined documentation for simplicity
#[doc(inline)]
pub use config::{GeneratorConfig, QuantityConfig, UnionGridMode};

#[doc(inline)]
pub use container::{AdjointData, AdjointTable, CrossSection, ForwardData, ForwardTable};

#[doc(inline)]
pub use driver::{AdjointDataGenerator, CrossSectionFn, DistributionFn};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use quantity::Quantity;

#[doc(inline)]
pub use tabular::Tabular;

#[doc(inline)]
pub use two_variable::{
    AdjointIncoherent, Boundaries, Bremsstrahlung, Electroionization, TwoVariableGridGenerator,
    ELECTRON_REST_MASS_ENERGY,
};
