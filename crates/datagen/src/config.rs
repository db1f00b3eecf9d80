//! Generation settings, loaded from JSON or built in code

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// external crates
use serde::{Deserialize, Serialize};

// xsgrid modules
use xsgrid_grid::ConvergenceCriteria;
use xsgrid_utils::f;

// internal modules
use crate::error::{Error, Result};
use crate::quantity::Quantity;

/// How the union energy grid of the adjoint data is built
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnionGridMode {
    /// Refine a new union grid against every quantity
    #[default]
    Recalculate,
    /// Take the forward union grid as it is, from the points bracketing the
    /// energy limits
    ReuseForward,
}

/// Tolerances and nudges for a single quantity
///
/// - `evaluation_tol` - convergence of every secondary grid
/// - `grid_convergence_tol` - convergence of the primary energy grid
/// - `grid_absolute_diff_tol` - absolute difference for dirty convergence
/// - `grid_distance_tol` - relative distance for dirty convergence
/// - `nudge_value` - offset from the lower kinematic boundary at which
///   secondary grids start
///
/// Missing fields in JSON take their default values.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantityConfig {
    pub evaluation_tol: f64,
    pub grid_convergence_tol: f64,
    pub grid_absolute_diff_tol: f64,
    pub grid_distance_tol: f64,
    pub nudge_value: f64,
}

impl QuantityConfig {
    /// Criteria for the primary grid, and any one dimensional grid
    pub fn grid_criteria(&self) -> ConvergenceCriteria {
        ConvergenceCriteria {
            convergence_tol: self.grid_convergence_tol,
            absolute_diff_tol: self.grid_absolute_diff_tol,
            distance_tol: self.grid_distance_tol,
        }
    }

    /// Criteria for every secondary grid
    pub fn evaluation_criteria(&self) -> ConvergenceCriteria {
        ConvergenceCriteria {
            convergence_tol: self.evaluation_tol,
            absolute_diff_tol: self.grid_absolute_diff_tol,
            distance_tol: self.grid_distance_tol,
        }
    }

    /// Check every value is within its valid range
    pub fn validate(&self) -> Result<()> {
        for criteria in [self.grid_criteria(), self.evaluation_criteria()] {
            criteria
                .validate()
                .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        }

        if !(self.nudge_value >= 0.0 && self.nudge_value.is_finite()) {
            return Err(Error::InvalidConfig(f!(
                "nudge_value = {} must be positive and finite",
                self.nudge_value
            )));
        }

        Ok(())
    }
}

impl Default for QuantityConfig {
    fn default() -> Self {
        Self {
            evaluation_tol: 1e-7,
            grid_convergence_tol: 1e-3,
            grid_absolute_diff_tol: 1e-13,
            grid_distance_tol: 1e-13,
            nudge_value: 1e-7,
        }
    }
}

/// Settings for a full adjoint data generation run
///
/// Only the energy limits are required in JSON.
///
/// ```rust
/// # use xsgrid_datagen::{GeneratorConfig, Quantity, UnionGridMode};
/// let config: GeneratorConfig = serde_json::from_str(
///     r#"{
///         "min_energy": 1e-5,
///         "max_energy": 20.0,
///         "union_grid": "reuse-forward",
///         "overrides": { "bremsstrahlung": { "evaluation_tol": 1e-5 } }
///     }"#,
/// )
/// .unwrap();
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.union_grid, UnionGridMode::ReuseForward);
/// assert_eq!(config.quantity(&Quantity::Bremsstrahlung).evaluation_tol, 1e-5);
/// assert_eq!(config.quantity(&Quantity::TotalElastic).evaluation_tol, 1e-7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Lowest energy of the adjoint tables
    pub min_energy: f64,
    /// Highest energy of the adjoint tables
    pub max_energy: f64,
    /// Settings for any quantity without an override
    #[serde(default)]
    pub defaults: QuantityConfig,
    /// Per-quantity settings
    #[serde(default)]
    pub overrides: BTreeMap<Quantity, QuantityConfig>,
    /// Union energy grid construction
    #[serde(default)]
    pub union_grid: UnionGridMode,
    /// Relative extension of secondary grids beyond the maximum energy
    #[serde(default = "default_max_table_nudge_factor")]
    pub max_table_nudge_factor: f64,
    /// Dirty convergence is an error rather than a warning
    #[serde(default)]
    pub strict: bool,
    /// Log every accepted primary grid point
    #[serde(default)]
    pub verbose: bool,
    /// Show progress bars
    #[serde(default)]
    pub progress: bool,
}

fn default_max_table_nudge_factor() -> f64 {
    1e-4
}

impl GeneratorConfig {
    /// Default settings for an energy range
    pub fn new(min_energy: f64, max_energy: f64) -> Self {
        Self {
            min_energy,
            max_energy,
            defaults: QuantityConfig::default(),
            overrides: BTreeMap::new(),
            union_grid: UnionGridMode::default(),
            max_table_nudge_factor: default_max_table_nudge_factor(),
            strict: false,
            verbose: false,
            progress: false,
        }
    }

    /// Read and validate settings from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Settings for a particular quantity
    pub fn quantity(&self, quantity: &Quantity) -> &QuantityConfig {
        self.overrides.get(quantity).unwrap_or(&self.defaults)
    }

    /// Upper boundary of every secondary grid
    pub fn max_table_energy(&self) -> f64 {
        self.max_energy * (1.0 + self.max_table_nudge_factor)
    }

    /// Check the energy limits and every quantity setting
    pub fn validate(&self) -> Result<()> {
        if !(self.min_energy > 0.0 && self.min_energy.is_finite()) {
            return Err(Error::InvalidConfig(f!(
                "min_energy = {} must be positive and finite",
                self.min_energy
            )));
        }

        if !(self.min_energy < self.max_energy && self.max_energy.is_finite()) {
            return Err(Error::InvalidConfig(f!(
                "max_energy = {} must be finite and above min_energy = {}",
                self.max_energy,
                self.min_energy
            )));
        }

        if !(self.max_table_nudge_factor >= 0.0 && self.max_table_nudge_factor.is_finite()) {
            return Err(Error::InvalidConfig(f!(
                "max_table_nudge_factor = {} must be positive and finite",
                self.max_table_nudge_factor
            )));
        }

        self.defaults.validate()?;
        for (quantity, config) in &self.overrides {
            config
                .validate()
                .map_err(|e| Error::InvalidConfig(f!("{quantity}: {e}")))?;
        }

        Ok(())
    }
}
