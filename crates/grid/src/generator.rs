//! Adaptive one dimensional grid generation

// standard library
use std::collections::VecDeque;

// external crates
use log::{debug, warn};
use serde::{Deserialize, Serialize};

// xsgrid modules
use xsgrid_interp::InterpPolicy;
use xsgrid_utils::{absolute_difference, f, relative_error, SliceExt, ValueExt};

// internal modules
use crate::criteria::ConvergenceCriteria;
use crate::error::{Error, Result};

/// Default cap on the number of midpoints inserted in a single session
pub const DEFAULT_MAX_REFINEMENTS: usize = 1_000_000;

/// Final state of a refinement session
///
/// Dirty convergence means at least one interval was accepted because a
/// distance or absolute difference tolerance was hit before the convergence
/// tolerance, or because the interval could not be refined any further.
///
/// ```rust
/// # use xsgrid_grid::Convergence;
/// let status = Convergence::Converged;
/// assert_eq!(status.and(Convergence::DirtyConverged), Convergence::DirtyConverged);
/// assert!(!status.is_dirty());
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Convergence {
    #[default]
    Converged,
    DirtyConverged,
}

impl Convergence {
    /// True if any interval converged dirty
    pub fn is_dirty(&self) -> bool {
        *self == Convergence::DirtyConverged
    }

    /// Combine the status of two sessions, dirty wins
    pub fn and(self, other: Self) -> Self {
        if self.is_dirty() || other.is_dirty() {
            Convergence::DirtyConverged
        } else {
            Convergence::Converged
        }
    }
}

impl std::fmt::Display for Convergence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Convergence::Converged => write!(f, "converged"),
            Convergence::DirtyConverged => write!(f, "dirty converged"),
        }
    }
}

/// Interval under test during bisection
///
/// The `result` is the interpolated estimate at the midpoint and `error` is
/// its relative error from the exact value.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub result: f64,
    pub error: f64,
}

/// A refined grid with the function evaluated at every grid point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Refined {
    pub grid: Vec<f64>,
    pub values: Vec<f64>,
    pub status: Convergence,
}

/// Adaptive grid generator
///
/// Refines a grid by bisection until the chosen [InterpPolicy] reproduces the
/// function at the midpoint of every interval to within the
/// [ConvergenceCriteria]. Midpoints are taken in processed space, so a
/// `LOG_LOG` policy bisects geometrically.
///
/// ```rust
/// # use xsgrid_grid::{ConvergenceCriteria, GridGenerator};
/// # use xsgrid_interp::InterpPolicy;
/// let generator =
///     GridGenerator::new(InterpPolicy::LIN_LIN, ConvergenceCriteria::default()).unwrap();
///
/// let mut grid = vec![0.0, 1.0];
/// generator.generate_in_place(&mut grid, |x| x * x).unwrap();
///
/// // end points are fixed and the grid only ever grows
/// assert_eq!(grid[0], 0.0);
/// assert_eq!(grid[grid.len() - 1], 1.0);
/// assert!(grid.len() > 2);
/// ```
///
/// Points the function must pass through exactly, such as either side of a
/// discontinuity, should be included in the initial grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridGenerator {
    policy: InterpPolicy,
    criteria: ConvergenceCriteria,
    strict: bool,
    max_refinements: usize,
}

impl GridGenerator {
    /// New generator that warns on dirty convergence
    pub fn new(policy: InterpPolicy, criteria: ConvergenceCriteria) -> Result<Self> {
        criteria.validate()?;
        Ok(Self {
            policy,
            criteria,
            strict: false,
            max_refinements: DEFAULT_MAX_REFINEMENTS,
        })
    }

    /// Return dirty convergence as an error rather than a warning
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Limit the number of midpoints inserted in a single session
    pub fn with_max_refinements(mut self, max_refinements: usize) -> Self {
        self.max_refinements = max_refinements;
        self
    }

    pub fn policy(&self) -> InterpPolicy {
        self.policy
    }

    pub fn criteria(&self) -> ConvergenceCriteria {
        self.criteria
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn max_refinements(&self) -> usize {
        self.max_refinements
    }

    /// Refine the whole grid in place
    pub fn generate_in_place<F>(&self, grid: &mut Vec<f64>, f: F) -> Result<Convergence>
    where
        F: Fn(f64) -> f64,
    {
        let mut values = Vec::with_capacity(grid.len());
        self.generate_and_evaluate_in_place(grid, &mut values, f)
    }

    /// Refine the whole grid in place, keeping the evaluated function
    ///
    /// Any previous content of `values` is replaced.
    pub fn generate_and_evaluate_in_place<F>(
        &self,
        grid: &mut Vec<f64>,
        values: &mut Vec<f64>,
        f: F,
    ) -> Result<Convergence>
    where
        F: Fn(f64) -> f64,
    {
        self.check_grid(grid)?;
        let (min, max) = (grid[0], grid[grid.len() - 1]);
        self.refine(grid, values, &f, min, max)
    }

    /// Refine only the part of the grid between `min` and `max`
    ///
    /// Bounds are clamped to the grid. Points outside of them are kept and
    /// never refined.
    pub fn refine_in_place<F>(
        &self,
        grid: &mut Vec<f64>,
        f: F,
        min: f64,
        max: f64,
    ) -> Result<Convergence>
    where
        F: Fn(f64) -> f64,
    {
        let mut values = Vec::with_capacity(grid.len());
        self.refine_and_evaluate_in_place(grid, &mut values, f, min, max)
    }

    /// See [GridGenerator::refine_in_place], keeping the evaluated function
    pub fn refine_and_evaluate_in_place<F>(
        &self,
        grid: &mut Vec<f64>,
        values: &mut Vec<f64>,
        f: F,
        min: f64,
        max: f64,
    ) -> Result<Convergence>
    where
        F: Fn(f64) -> f64,
    {
        self.check_grid(grid)?;
        if !(min < max) {
            return Err(Error::InvalidBounds { min, max });
        }

        // don't let the window extend beyond the grid
        let min = min.max(grid[0]);
        let max = max.min(grid[grid.len() - 1]);
        if !(min < max) {
            return Err(Error::InvalidBounds { min, max });
        }

        self.refine(grid, values, &f, min, max)
    }

    /// Refine a copy of the initial grid
    pub fn generate<F>(&self, initial: &[f64], f: F) -> Result<(Vec<f64>, Convergence)>
    where
        F: Fn(f64) -> f64,
    {
        let mut grid = initial.to_vec();
        let status = self.generate_in_place(&mut grid, f)?;
        Ok((grid, status))
    }

    /// Refine a copy of the initial grid, keeping the evaluated function
    pub fn generate_and_evaluate<F>(&self, initial: &[f64], f: F) -> Result<Refined>
    where
        F: Fn(f64) -> f64,
    {
        let mut grid = initial.to_vec();
        let mut values = Vec::with_capacity(grid.len());
        let status = self.generate_and_evaluate_in_place(&mut grid, &mut values, f)?;
        Ok(Refined {
            grid,
            values,
            status,
        })
    }

    /// Bisection over a queue of pending upper bounds
    ///
    /// Expects `grid[0] <= min < max <= grid[last]`.
    fn refine<F>(
        &self,
        grid: &mut Vec<f64>,
        values: &mut Vec<f64>,
        f: &F,
        min: f64,
        max: f64,
    ) -> Result<Convergence>
    where
        F: Fn(f64) -> f64,
    {
        let mut session = Session::default();

        // pending upper bounds, with the function value if already known
        let mut queue: VecDeque<(f64, Option<f64>)> = grid
            .iter()
            .filter(|x| **x > min && **x <= max)
            .map(|x| (*x, None))
            .collect();

        if queue.back().map(|(x, _)| *x) != Some(max) {
            queue.push_back((max, None));
        }

        let mut refined = Vec::with_capacity(grid.len());
        let mut evaluated = Vec::with_capacity(grid.len());

        // points below the window are kept as they are
        for x in grid.iter().filter(|x| **x < min) {
            refined.push(*x);
            evaluated.push(self.evaluate(f, *x)?);
        }

        let mut x0 = min;
        let mut y0 = self.evaluate(f, x0)?;

        while let Some((x1, known)) = queue.front().copied() {
            let y1 = match known {
                Some(y) => y,
                None => self.evaluate(f, x1)?,
            };

            let x_mid = self.policy.recover_processed_indep_var(
                0.5 * (self.policy.process_indep_var(x0) + self.policy.process_indep_var(x1)),
            );
            let y_exact = self.evaluate(f, x_mid)?;
            let y_estimate = self.policy.interpolate(x0, x1, x_mid, y0, y1);

            if self.has_converged(&mut session, x0, x_mid, x1, y_estimate, y_exact)? {
                refined.push(x0);
                evaluated.push(y0);
                queue.pop_front();
                x0 = x1;
                y0 = y1;
            } else {
                if let Some(front) = queue.front_mut() {
                    front.1 = Some(y1);
                }
                queue.push_front((x_mid, Some(y_exact)));
                session.refinements += 1;
            }
        }

        refined.push(x0);
        evaluated.push(y0);

        // points above the window are kept as they are
        for x in grid.iter().filter(|x| **x > max) {
            refined.push(*x);
            evaluated.push(self.evaluate(f, *x)?);
        }

        debug!(
            "Refined [{}, {}] with {} new points, {}",
            min.sci(5, 2),
            max.sci(5, 2),
            session.refinements,
            session.status
        );

        *grid = refined;
        *values = evaluated;
        Ok(session.status)
    }

    /// Decide whether an interval is accepted
    ///
    /// Dirty acceptance is either an error or a warning depending on the
    /// strict flag.
    fn has_converged(
        &self,
        session: &mut Session,
        x0: f64,
        x_mid: f64,
        x1: f64,
        y_estimate: f64,
        y_exact: f64,
    ) -> Result<bool> {
        let rel_error = relative_error(y_exact, y_estimate);
        if rel_error <= self.criteria.convergence_tol {
            return Ok(true);
        }

        let abs_diff = absolute_difference(y_exact, y_estimate);
        let distance = relative_error(x0, x1);

        let reason = if distance <= self.criteria.distance_tol {
            f!(
                "distance tolerance ({}) hit before convergence ({}), relError(x0, x1) = {}, relError(y_mid) = {}",
                self.criteria.distance_tol.sci(2, 2),
                self.criteria.convergence_tol.sci(2, 2),
                distance.sci(5, 2),
                rel_error.sci(5, 2)
            )
        } else if abs_diff <= self.criteria.absolute_diff_tol {
            f!(
                "absolute difference tolerance hit before convergence, x_mid = {}, y_exact = {}, y_estimate = {}, abs_diff = {}",
                x_mid.sci(5, 2),
                y_exact.sci(5, 2),
                y_estimate.sci(5, 2),
                abs_diff.sci(5, 2)
            )
        } else if x_mid <= x0 || x_mid >= x1 {
            f!(
                "interval can not be bisected any further, x_mid = {}",
                x_mid.sci(5, 2)
            )
        } else if session.refinements >= self.max_refinements {
            f!("refinement limit ({}) reached", self.max_refinements)
        } else {
            return Ok(false);
        };

        let bin = Bin {
            lower: x0,
            upper: x1,
            result: y_estimate,
            error: rel_error,
        };

        session.dirty(self.strict, "Grid generator", reason, bin)?;
        Ok(true)
    }

    /// Evaluate the function, rejecting values the policy can not use
    fn evaluate<F>(&self, f: &F, x: f64) -> Result<f64>
    where
        F: Fn(f64) -> f64,
    {
        let value = f(x);
        if !value.is_finite() {
            return Err(Error::NonFiniteEvaluation { x, value });
        }
        Ok(self.policy.dep.check_dep(value)?)
    }

    /// Common preconditions on a grid before refinement
    fn check_grid(&self, grid: &[f64]) -> Result<()> {
        if grid.len() < 2 {
            return Err(Error::TooFewPoints {
                found: grid.len(),
                required: 2,
            });
        }

        if !grid.is_strictly_ascending() {
            return Err(Error::UnsortedGrid);
        }

        for x in grid {
            self.policy.indep.check_indep(*x)?;
        }

        Ok(())
    }
}

/// Mutable state of a single refinement session
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub(crate) status: Convergence,
    pub(crate) refinements: usize,
}

impl Session {
    /// Accept an interval dirty, or fail if dirty convergence is an error
    pub(crate) fn dirty(
        &mut self,
        strict: bool,
        tag: &str,
        reason: String,
        bin: Bin,
    ) -> Result<()> {
        if strict {
            return Err(Error::DirtyConvergence { reason, bin });
        }

        warn!("{tag}: {reason}");
        self.status = Convergence::DirtyConverged;
        Ok(())
    }
}
