//! Secondary grids between kinematic boundaries
//!
//! Adjoint distributions are tabulated against an outgoing energy that is
//! limited below by a kinematic boundary depending on the incoming energy,
//! and above by the maximum table energy. The distributions are usually zero
//! or singular at the lower boundary, so secondary grids start at a nudged
//! value just above it and the exact boundary is added back with a zero value
//! afterwards.

// external crates
use itertools::Itertools;
use kdam::par_tqdm;
use log::{debug, warn};
use rayon::prelude::*;

// xsgrid modules
use xsgrid_grid::{Convergence, Refined, SecondaryGridInitializer, TwoDGrid, TwoDGridGenerator};
use xsgrid_interp::TwoDPolicy;
use xsgrid_utils::{relative_error, SliceExt};

// internal modules
use crate::config::QuantityConfig;
use crate::error::{Error, Result};

/// Electron rest mass energy in MeV
pub const ELECTRON_REST_MASS_ENERGY: f64 = 0.510_998_95;

/// Kinematic limits of a secondary grid
///
/// Secondary grids run from [Boundaries::evaluation_start] up to the maximum
/// table energy, with any critical values in between.
pub trait Boundaries {
    /// Exact lower boundary of the secondary variable
    fn lower(&self, primary: f64) -> f64;

    /// First secondary value to evaluate, nudged above the lower boundary
    fn evaluation_start(&self, primary: f64, nudge: f64) -> f64;

    /// Secondary values that must be on the grid
    fn critical_values(&self, _primary: f64) -> Vec<f64> {
        Vec::new()
    }

    /// Add the exact lower boundary with a zero value after refinement
    fn zero_at_lower_boundary(&self) -> bool {
        true
    }
}

impl<T: Boundaries + ?Sized> Boundaries for Box<T> {
    fn lower(&self, primary: f64) -> f64 {
        (**self).lower(primary)
    }

    fn evaluation_start(&self, primary: f64, nudge: f64) -> f64 {
        (**self).evaluation_start(primary, nudge)
    }

    fn critical_values(&self, primary: f64) -> Vec<f64> {
        (**self).critical_values(primary)
    }

    fn zero_at_lower_boundary(&self) -> bool {
        (**self).zero_at_lower_boundary()
    }
}

/// Adjoint incoherent scattering, against the maximum outgoing energy
///
/// The maximum energy grid includes the Compton edge, the energy a photon
/// must have had to be scattered down to `E` at 180 degrees.
///
/// ```rust
/// # use xsgrid_datagen::{AdjointIncoherent, Boundaries};
/// let boundaries = AdjointIncoherent;
/// assert_eq!(boundaries.lower(0.1), 0.1);
///
/// let edge = boundaries.critical_values(0.1)[0];
/// assert!((edge - 0.1 / (1.0 - 0.2 / 0.51099895)).abs() < 1e-12);
///
/// // no edge above half the rest mass energy
/// assert!(boundaries.critical_values(0.3).is_empty());
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct AdjointIncoherent;

impl AdjointIncoherent {
    /// Maximum incoming energy that can scatter down to `energy`
    pub fn compton_edge(energy: f64) -> Option<f64> {
        let denominator = 1.0 - 2.0 * energy / ELECTRON_REST_MASS_ENERGY;
        (denominator > 0.0).then(|| energy / denominator)
    }
}

impl Boundaries for AdjointIncoherent {
    fn lower(&self, primary: f64) -> f64 {
        primary
    }

    fn evaluation_start(&self, primary: f64, nudge: f64) -> f64 {
        primary * (1.0 + nudge)
    }

    fn critical_values(&self, primary: f64) -> Vec<f64> {
        Self::compton_edge(primary).into_iter().collect()
    }
}

/// Adjoint bremsstrahlung, against the outgoing electron energy
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Bremsstrahlung;

impl Boundaries for Bremsstrahlung {
    fn lower(&self, primary: f64) -> f64 {
        primary
    }

    fn evaluation_start(&self, primary: f64, nudge: f64) -> f64 {
        primary + nudge
    }
}

/// Adjoint electroionization of a subshell, against the outgoing energy
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Electroionization {
    pub binding_energy: f64,
}

impl Boundaries for Electroionization {
    fn lower(&self, primary: f64) -> f64 {
        primary + self.binding_energy
    }

    fn evaluation_start(&self, primary: f64, nudge: f64) -> f64 {
        primary + self.binding_energy + nudge
    }
}

/// Initial secondary grids for the two dimensional engine
#[derive(Debug, Clone)]
struct SecondaryLimits<B> {
    boundaries: B,
    nudge: f64,
    upper: f64,
}

impl<B: Boundaries> SecondaryLimits<B> {
    fn check(&self, primary: f64) -> Result<(f64, f64)> {
        let lower = self.boundaries.evaluation_start(primary, self.nudge);
        if !(lower < self.upper) {
            return Err(Error::InvertedBoundary {
                primary,
                lower,
                upper: self.upper,
            });
        }
        Ok((lower, self.upper))
    }
}

impl<B: Boundaries> SecondaryGridInitializer for SecondaryLimits<B> {
    fn initialize_secondary_grid(&self, primary: f64) -> xsgrid_grid::Result<Vec<f64>> {
        let lower = self.boundaries.evaluation_start(primary, self.nudge);
        if !(lower < self.upper) {
            return Err(xsgrid_grid::Error::InvalidBounds {
                min: lower,
                max: self.upper,
            });
        }

        Ok(self
            .boundaries
            .critical_values(primary)
            .into_iter()
            .filter(|y| *y > lower && *y < self.upper)
            .chain([lower, self.upper])
            .sorted_by(f64::total_cmp)
            .dedup()
            .collect())
    }
}

/// Generator for two variable tables between kinematic boundaries
///
/// ```rust
/// # use xsgrid_datagen::{Bremsstrahlung, QuantityConfig, TwoVariableGridGenerator};
/// # use xsgrid_interp::TwoDPolicy;
/// let config = QuantityConfig::default();
/// let generator =
///     TwoVariableGridGenerator::new(TwoDPolicy::LIN_LIN_LIN, Bremsstrahlung, &config, 20.0)
///         .unwrap();
///
/// let table = generator
///     .generate_on_primary(&[1.0, 10.0], |e, e_out| e_out - e)
///     .unwrap();
///
/// // the exact lower boundary is added back with a zero value
/// assert_eq!(table.secondary[0], vec![1.0, 1.0 + 1e-7, 20.0]);
/// assert_eq!(table.values[0][0], 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct TwoVariableGridGenerator<B> {
    engine: TwoDGridGenerator<SecondaryLimits<B>>,
    progress: bool,
}

impl<B: Boundaries + Sync> TwoVariableGridGenerator<B> {
    /// New generator with secondary grids up to `max_table_energy`
    pub fn new(
        policy: TwoDPolicy,
        boundaries: B,
        config: &QuantityConfig,
        max_table_energy: f64,
    ) -> Result<Self> {
        config.validate()?;
        let limits = SecondaryLimits {
            boundaries,
            nudge: config.nudge_value,
            upper: max_table_energy,
        };

        Ok(Self {
            engine: TwoDGridGenerator::new(
                policy,
                limits,
                config.grid_criteria(),
                config.evaluation_criteria(),
            )?,
            progress: false,
        })
    }

    /// Return dirty convergence as an error
    pub fn with_strict(self, strict: bool) -> Self {
        Self {
            engine: self.engine.with_strict(strict),
            ..self
        }
    }

    /// Log every accepted primary grid point
    pub fn with_verbose(self, verbose: bool) -> Self {
        Self {
            engine: self.engine.with_verbose(verbose),
            ..self
        }
    }

    /// Show a progress bar while generating secondary grids
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn boundaries(&self) -> &B {
        &self.engine.initializer().boundaries
    }

    pub fn policy(&self) -> TwoDPolicy {
        self.engine.policy()
    }

    /// Upper boundary of every secondary grid
    pub fn max_table_energy(&self) -> f64 {
        self.engine.initializer().upper
    }

    /// Evaluated range of the secondary grid at a primary value
    pub fn secondary_limits(&self, primary: f64) -> Result<(f64, f64)> {
        self.engine.initializer().check(primary)
    }

    /// Secondary grid and values at a single primary value
    pub fn generate_secondary<F>(&self, primary: f64, f: &F) -> Result<(Vec<f64>, Vec<f64>)>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.secondary_limits(primary)?;
        let Refined { grid, values, .. } = self.engine.generate_secondary(primary, f)?;
        Ok(self.with_lower_boundary(primary, grid, values))
    }

    /// Secondary grids on a fixed primary grid
    ///
    /// Every primary point is independent, so they are generated in parallel.
    pub fn generate_on_primary<F>(&self, primary: &[f64], f: F) -> Result<TwoDGrid>
    where
        F: Fn(f64, f64) -> f64 + Sync,
    {
        self.check_primary(primary)?;
        let tables = self.par_generate(primary, |x| self.generate_secondary(x, &f))?;
        Ok(Self::collect_table(primary, tables))
    }

    /// Refine the primary grid as well as every secondary grid
    pub fn generate_converged<F>(
        &self,
        initial_primary: &[f64],
        f: F,
    ) -> Result<(TwoDGrid, Convergence)>
    where
        F: Fn(f64, f64) -> f64,
    {
        for x in initial_primary {
            self.secondary_limits(*x)?;
        }

        let (mut table, status) = self.engine.generate(initial_primary, &f)?;

        for ((x, grid), values) in table
            .primary
            .iter()
            .zip(table.secondary.iter_mut())
            .zip(table.values.iter_mut())
        {
            let (new_grid, new_values) =
                self.with_lower_boundary(*x, std::mem::take(grid), std::mem::take(values));
            *grid = new_grid;
            *values = new_values;
        }

        Ok((table, status))
    }

    /// Secondary grids on an enlarged primary grid
    ///
    /// Any primary point already in `previous`, to within the distance
    /// tolerance, keeps its secondary grid. Only the new points are generated.
    pub fn update_on_enlarged_primary<F>(
        &self,
        previous: &TwoDGrid,
        enlarged: &[f64],
        f: F,
    ) -> Result<TwoDGrid>
    where
        F: Fn(f64, f64) -> f64 + Sync,
    {
        previous.validate()?;
        self.check_primary(enlarged)?;

        let tolerance = self.engine.criteria().distance_tol;
        let find_previous = |x: f64| {
            let i = previous.primary.partition_point(|p| *p < x);
            [i.checked_sub(1), Some(i)]
                .into_iter()
                .flatten()
                .filter(|j| *j < previous.len())
                .find(|j| relative_error(previous.primary[*j], x) <= tolerance)
        };

        let reused = enlarged.iter().filter_map(|x| find_previous(*x)).count();
        debug!(
            "Reusing {reused} of {} secondary grids, generating {}",
            enlarged.len(),
            enlarged.len() - reused
        );

        let tables = self.par_generate(enlarged, |x| match find_previous(x) {
            Some(j) => Ok((previous.secondary[j].clone(), previous.values[j].clone())),
            None => self.generate_secondary(x, &f),
        })?;

        Ok(Self::collect_table(enlarged, tables))
    }

    /// Every primary point is sorted and has a valid secondary range
    fn check_primary(&self, primary: &[f64]) -> Result<()> {
        if primary.is_empty() {
            return Err(xsgrid_grid::Error::TooFewPoints {
                found: 0,
                required: 1,
            }
            .into());
        }

        if !primary.is_strictly_ascending() {
            return Err(xsgrid_grid::Error::UnsortedGrid.into());
        }

        for x in primary {
            self.secondary_limits(*x)?;
        }
        Ok(())
    }

    /// Map over primary points in parallel, in order
    fn par_generate<M>(&self, primary: &[f64], map: M) -> Result<Vec<(Vec<f64>, Vec<f64>)>>
    where
        M: Fn(f64) -> Result<(Vec<f64>, Vec<f64>)> + Sync + Send,
    {
        if !self.progress {
            return primary.par_iter().map(|x| map(*x)).collect();
        }

        let tables = par_tqdm!(
            primary.par_iter().map(|x| map(*x)),
            total = primary.len(),
            bar_format = "Secondary grids: {count}/{total} [{rate:.2} grids/s]  "
        )
        .collect();
        eprintln!();
        tables
    }

    /// Insert the exact lower boundary with a zero value if it is missing
    fn with_lower_boundary(
        &self,
        primary: f64,
        mut grid: Vec<f64>,
        mut values: Vec<f64>,
    ) -> (Vec<f64>, Vec<f64>) {
        if !self.boundaries().zero_at_lower_boundary() {
            return (grid, values);
        }

        let lower = self.boundaries().lower(primary);
        let i = grid.partition_point(|y| *y < lower);
        if grid.get(i) != Some(&lower) {
            grid.insert(i, lower);
            values.insert(i, 0.0);
        } else if values[i] != 0.0 {
            warn!("Non-zero value {} at lower boundary {lower}", values[i]);
        }

        (grid, values)
    }

    fn collect_table(primary: &[f64], tables: Vec<(Vec<f64>, Vec<f64>)>) -> TwoDGrid {
        let (secondary, values) = tables.into_iter().unzip();
        TwoDGrid {
            primary: primary.to_vec(),
            secondary,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> QuantityConfig {
        QuantityConfig {
            evaluation_tol: 1e-3,
            ..Default::default()
        }
    }

    #[rstest]
    fn evaluation_starts(config: QuantityConfig) {
        let nudge = config.nudge_value;
        assert_eq!(AdjointIncoherent.evaluation_start(2.0, nudge), 2.0 * (1.0 + nudge));
        assert_eq!(Bremsstrahlung.evaluation_start(2.0, nudge), 2.0 + nudge);

        let ionization = Electroionization {
            binding_energy: 0.5,
        };
        assert_eq!(ionization.lower(2.0), 2.5);
        assert_eq!(ionization.evaluation_start(2.0, nudge), 2.5 + nudge);
    }

    #[rstest]
    fn inverted_boundary(config: QuantityConfig) {
        let generator = TwoVariableGridGenerator::new(
            TwoDPolicy::LIN_LIN_LIN,
            Electroionization {
                binding_energy: 1.0,
            },
            &config,
            10.0,
        )
        .unwrap();

        assert!(generator.secondary_limits(8.0).is_ok());
        assert!(matches!(
            generator.generate_on_primary(&[1.0, 9.5], |_, _| 1.0),
            Err(Error::InvertedBoundary { primary, upper, .. }) if primary == 9.5 && upper == 10.0
        ));
    }

    #[rstest]
    fn compton_edge_on_secondary_grid(config: QuantityConfig) {
        let generator =
            TwoVariableGridGenerator::new(TwoDPolicy::LIN_LIN_LIN, AdjointIncoherent, &config, 1.0)
                .unwrap();

        let edge = AdjointIncoherent::compton_edge(0.1).unwrap();
        let (grid, values) = generator.generate_secondary(0.1, &|_: f64, y: f64| y).unwrap();

        assert_eq!(grid[0], 0.1);
        assert_eq!(values[0], 0.0);
        assert!(grid.contains(&edge));
        assert_eq!(grid[grid.len() - 1], 1.0);
    }

    #[rstest]
    fn boundary_already_present(config: QuantityConfig) {
        struct Exact;
        impl Boundaries for Exact {
            fn lower(&self, primary: f64) -> f64 {
                primary
            }
            fn evaluation_start(&self, primary: f64, _nudge: f64) -> f64 {
                primary
            }
        }

        let generator =
            TwoVariableGridGenerator::new(TwoDPolicy::LIN_LIN_LIN, Exact, &config, 10.0).unwrap();
        let (grid, values) = generator.generate_secondary(1.0, &|_: f64, y: f64| y).unwrap();
        assert_eq!(grid, vec![1.0, 10.0]);
        assert_eq!(values, vec![1.0, 10.0]);
    }

    #[rstest]
    fn unsorted_primary(config: QuantityConfig) {
        let generator =
            TwoVariableGridGenerator::new(TwoDPolicy::LIN_LIN_LIN, Bremsstrahlung, &config, 10.0)
                .unwrap();
        assert!(generator.generate_on_primary(&[2.0, 1.0], |_, _| 1.0).is_err());
        assert!(generator.generate_on_primary(&[], |_, _| 1.0).is_err());
    }
}
