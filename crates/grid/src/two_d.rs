//! Adaptive generation of two dimensional grids

// standard library
use std::collections::VecDeque;

// external crates
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

// xsgrid modules
use xsgrid_interp::{TabulatedGrid, TwoDPolicy};
use xsgrid_utils::{absolute_difference, f, relative_error, SliceExt, ValueExt};

// internal modules
use crate::criteria::ConvergenceCriteria;
use crate::error::{Error, Result};
use crate::generator::{Bin, Convergence, GridGenerator, Refined, Session};

/// Provides the starting secondary grid for any primary value
///
/// Implementations decide the kinematic limits of the secondary variable.
/// Critical primary values, such as where a limit changes behaviour, can be
/// added to the primary grid before refinement.
pub trait SecondaryGridInitializer {
    /// Initial secondary grid at a primary value, at least two points
    fn initialize_secondary_grid(&self, primary: f64) -> Result<Vec<f64>>;

    /// Add any critical values to the primary grid queue
    fn add_critical_values_to_primary_grid(&self, _primary_grid: &mut VecDeque<f64>) {}
}

/// Outcome of checking a single primary interval
enum Interval {
    Converged,
    /// Midpoint and its secondary grid
    Split(f64, Refined),
}

/// Tabulated two dimensional function
///
/// Every primary grid point owns a secondary grid and the function values on
/// it.
///
/// ```rust
/// # use xsgrid_grid::TwoDGrid;
/// # use xsgrid_interp::TwoDPolicy;
/// let table = TwoDGrid {
///     primary: vec![0.0, 1.0],
///     secondary: vec![vec![0.0, 1.0], vec![0.0, 2.0]],
///     values: vec![vec![1.0, 1.0], vec![2.0, 2.0]],
/// };
///
/// let z = table.evaluate(&TwoDPolicy::LIN_LIN_LIN, 0.5, 0.75).unwrap();
/// assert!((z - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwoDGrid {
    pub primary: Vec<f64>,
    pub secondary: Vec<Vec<f64>>,
    pub values: Vec<Vec<f64>>,
}

impl TwoDGrid {
    /// Number of primary grid points
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Check every primary point has a matching secondary grid
    pub fn validate(&self) -> Result<()> {
        for found in [self.secondary.len(), self.values.len()] {
            if found != self.primary.len() {
                return Err(Error::MismatchedSecondaryGrids {
                    expected: self.primary.len(),
                    found,
                });
            }
        }

        if !self.primary.is_strictly_ascending() {
            return Err(Error::UnsortedGrid);
        }

        for (grid, values) in self.secondary.iter().zip(&self.values) {
            TabulatedGrid::new(grid, values)?;
            if !grid.is_strictly_ascending() {
                return Err(Error::UnsortedGrid);
            }
        }

        Ok(())
    }

    /// Secondary grid at primary index `i`
    pub fn grid_at(&self, i: usize) -> Result<TabulatedGrid<'_>> {
        let (Some(grid), Some(values)) = (self.secondary.get(i), self.values.get(i)) else {
            return Err(Error::MismatchedSecondaryGrids {
                expected: i + 1,
                found: self.secondary.len().min(self.values.len()),
            });
        };
        Ok(TabulatedGrid::new(grid, values)?)
    }

    /// Evaluate at (x, y) with unit-base interpolation between primary points
    pub fn evaluate(&self, policy: &TwoDPolicy, x: f64, y: f64) -> Result<f64> {
        let i = self.primary.find_bin_exclusive(x)?;
        Ok(policy.interpolate_unit_base(
            self.primary[i],
            self.primary[i + 1],
            x,
            y,
            &self.grid_at(i)?,
            &self.grid_at(i + 1)?,
        )?)
    }
}

/// Adaptive two dimensional grid generator
///
/// The secondary grid at every primary point is refined with a
/// [GridGenerator] using the `zy()` policy. The primary grid is then refined
/// by bisection until a secondary grid generated at the midpoint of each
/// primary interval is reproduced by unit-base interpolation of its
/// neighbours.
#[derive(Debug, Clone)]
pub struct TwoDGridGenerator<B> {
    policy: TwoDPolicy,
    initializer: B,
    criteria: ConvergenceCriteria,
    secondary: GridGenerator,
    verbose: bool,
}

impl<B: SecondaryGridInitializer> TwoDGridGenerator<B> {
    /// New generator with separate primary and secondary tolerances
    pub fn new(
        policy: TwoDPolicy,
        initializer: B,
        criteria: ConvergenceCriteria,
        secondary_criteria: ConvergenceCriteria,
    ) -> Result<Self> {
        criteria.validate()?;
        Ok(Self {
            policy,
            initializer,
            criteria,
            secondary: GridGenerator::new(policy.zy(), secondary_criteria)?,
            verbose: false,
        })
    }

    /// Return dirty convergence as an error, on both grids
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.secondary = self.secondary.with_strict(strict);
        self
    }

    /// Log every accepted primary grid point
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn policy(&self) -> TwoDPolicy {
        self.policy
    }

    pub fn initializer(&self) -> &B {
        &self.initializer
    }

    pub fn criteria(&self) -> ConvergenceCriteria {
        self.criteria
    }

    /// Generator used for every secondary grid
    pub fn secondary_generator(&self) -> &GridGenerator {
        &self.secondary
    }

    pub fn is_strict(&self) -> bool {
        self.secondary.is_strict()
    }

    /// Generate and evaluate the secondary grid at a single primary value
    pub fn generate_secondary<F>(&self, primary: f64, f: &F) -> Result<Refined>
    where
        F: Fn(f64, f64) -> f64,
    {
        let initial = self.initializer.initialize_secondary_grid(primary)?;
        self.secondary
            .generate_and_evaluate(&initial, |secondary| f(primary, secondary))
    }

    /// Refine the primary grid and generate every secondary grid on it
    ///
    /// The function takes the primary value first.
    pub fn generate<F>(&self, initial_primary: &[f64], f: F) -> Result<(TwoDGrid, Convergence)>
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut queue: VecDeque<f64> = initial_primary.iter().copied().collect();
        self.initializer
            .add_critical_values_to_primary_grid(&mut queue);

        // secondary grids are kept with their primary value once generated
        let mut queue: VecDeque<(f64, Option<Refined>)> = queue
            .into_iter()
            .sorted_by(f64::total_cmp)
            .dedup()
            .map(|x| (x, None))
            .collect();
        self.check_primary(&queue.iter().map(|(x, _)| *x).collect::<Vec<_>>())?;

        let mut session = Session::default();
        let mut table = TwoDGrid::default();

        // check_primary guarantees at least two points
        let Some((mut x0, _)) = queue.pop_front() else {
            return Err(Error::TooFewPoints {
                found: 0,
                required: 2,
            });
        };
        let mut grid_0 = self.generate_secondary(x0, &f)?;
        session.status = session.status.and(grid_0.status);

        while let Some((x1, cached)) = queue.front_mut() {
            let x1 = *x1;
            let grid_1 = match cached.take() {
                Some(refined) => refined,
                None => {
                    let refined = self.generate_secondary(x1, &f)?;
                    session.status = session.status.and(refined.status);
                    refined
                }
            };

            match self.check_interval(&mut session, x0, x1, &grid_0, &grid_1, &f)? {
                Interval::Converged => {
                    self.log_added_point(x0, table.len());
                    table.primary.push(x0);
                    table.secondary.push(grid_0.grid);
                    table.values.push(grid_0.values);

                    queue.pop_front();
                    x0 = x1;
                    grid_0 = grid_1;
                }
                Interval::Split(x_mid, grid_mid) => {
                    if let Some((_, cached)) = queue.front_mut() {
                        *cached = Some(grid_1);
                    }
                    session.status = session.status.and(grid_mid.status);
                    queue.push_front((x_mid, Some(grid_mid)));
                    session.refinements += 1;
                }
            }
        }

        self.log_added_point(x0, table.len());
        table.primary.push(x0);
        table.secondary.push(grid_0.grid);
        table.values.push(grid_0.values);

        debug!(
            "Generated {} primary grid points with {} refinements, {}",
            table.len(),
            session.refinements,
            session.status
        );

        Ok((table, session.status))
    }

    /// Midpoint of two primary values in processed space
    fn primary_midpoint(&self, x0: f64, x1: f64) -> f64 {
        self.policy.recover_processed_first_indep_var(
            0.5 * (self.policy.process_first_indep_var(x0)
                + self.policy.process_first_indep_var(x1)),
        )
    }

    /// Midpoint of two secondary values in processed space
    fn secondary_midpoint(&self, y0: f64, y1: f64) -> f64 {
        self.policy.recover_processed_second_indep_var(
            0.5 * (self.policy.process_second_indep_var(y0)
                + self.policy.process_second_indep_var(y1)),
        )
    }

    /// Check a primary interval against the grid generated at its midpoint
    ///
    /// An interval that has not converged is returned with its midpoint and
    /// the secondary grid already generated there.
    fn check_interval<F>(
        &self,
        session: &mut Session,
        x0: f64,
        x1: f64,
        refined_0: &Refined,
        refined_1: &Refined,
        f: &F,
    ) -> Result<Interval>
    where
        F: Fn(f64, f64) -> f64,
    {
        let x_mid = self.primary_midpoint(x0, x1);
        let distance = relative_error(x0, x1);

        let reason = if distance <= self.criteria.distance_tol {
            Some(f!(
                "distance tolerance hit before convergence, relError(primary_0, primary_1) = relError({}, {}) = {}",
                x0.sci(5, 2),
                x1.sci(5, 2),
                distance.sci(5, 2)
            ))
        } else if x_mid <= x0 || x_mid >= x1 {
            Some(f!(
                "primary interval can not be bisected any further, x_mid = {}",
                x_mid.sci(5, 2)
            ))
        } else if session.refinements >= self.secondary.max_refinements() {
            Some(f!(
                "refinement limit ({}) reached",
                self.secondary.max_refinements()
            ))
        } else {
            None
        };

        if let Some(reason) = reason {
            let bin = Bin {
                lower: x0,
                upper: x1,
                result: 0.0,
                error: distance,
            };
            session.dirty(self.is_strict(), "2D grid generator", reason, bin)?;
            return Ok(Interval::Converged);
        }

        let grid_0 = TabulatedGrid::new(&refined_0.grid, &refined_0.values)?;
        let grid_1 = TabulatedGrid::new(&refined_1.grid, &refined_1.values)?;
        let refined_mid = self.generate_secondary(x_mid, f)?;

        // every point of the intermediate grid
        for (y, exact) in refined_mid.grid.iter().zip(&refined_mid.values) {
            if !self.has_converged_at(session, x0, x1, x_mid, *y, *exact, &grid_0, &grid_1)? {
                return Ok(Interval::Split(x_mid, refined_mid));
            }
        }

        // and every midpoint between them
        for (y0, y1) in refined_mid.grid.iter().tuple_windows() {
            let y = self.secondary_midpoint(*y0, *y1);
            let exact = f(x_mid, y);
            if !exact.is_finite() {
                return Err(Error::NonFiniteEvaluation { x: y, value: exact });
            }

            if !self.has_converged_at(session, x0, x1, x_mid, y, exact, &grid_0, &grid_1)? {
                return Ok(Interval::Split(x_mid, refined_mid));
            }
        }

        Ok(Interval::Converged)
    }

    /// Compare unit-base interpolation against the exact value at (x, y)
    #[allow(clippy::too_many_arguments)]
    fn has_converged_at(
        &self,
        session: &mut Session,
        x0: f64,
        x1: f64,
        x: f64,
        y: f64,
        exact: f64,
        grid_0: &TabulatedGrid,
        grid_1: &TabulatedGrid,
    ) -> Result<bool> {
        let estimate = self
            .policy
            .interpolate_unit_base(x0, x1, x, y, grid_0, grid_1)?;

        let rel_error = relative_error(exact, estimate);
        let abs_diff = absolute_difference(exact, estimate);
        let failed = rel_error > self.criteria.convergence_tol;

        trace!(
            "primary = {}, secondary = {}, estimate = {}, exact = {}, converged = {}",
            x.sci(5, 2),
            y.sci(5, 2),
            estimate.sci(5, 2),
            exact.sci(5, 2),
            !failed
        );

        if failed && abs_diff > self.criteria.absolute_diff_tol {
            return Ok(false);
        }

        if failed {
            let reason = f!(
                "absolute difference tolerance hit before convergence, primary_0 = {}, primary_1 = {}, secondary = {}, abs_diff = {}",
                x0.sci(5, 2),
                x1.sci(5, 2),
                y.sci(5, 2),
                abs_diff.sci(5, 2)
            );
            let bin = Bin {
                lower: x0,
                upper: x1,
                result: estimate,
                error: rel_error,
            };
            session.dirty(self.is_strict(), "2D grid generator", reason, bin)?;
        }

        Ok(true)
    }

    fn check_primary(&self, primary: &[f64]) -> Result<()> {
        if primary.len() < 2 {
            return Err(Error::TooFewPoints {
                found: primary.len(),
                required: 2,
            });
        }

        for x in primary {
            self.policy.first.check_indep(*x)?;
        }

        Ok(())
    }

    fn log_added_point(&self, primary: f64, index: usize) {
        if self.verbose {
            info!("Added primary grid point {}: {}", index, primary.sci(5, 2));
        }
    }
}
