//! Union of independently refined grids

// external crates
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// internal modules
use crate::error::{Error, Result};
use crate::generator::{Convergence, GridGenerator};

/// A grid shared by several functions over a fixed `[min, max]` range
///
/// Every function evaluated on a union grid is represented to the accuracy of
/// the generator that refined it, so one grid can serve a whole set of
/// tabulated quantities.
///
/// ```rust
/// # use xsgrid_grid::UnionGrid;
/// let mut union = UnionGrid::initialize(&[5.0, 0.1, 2.0, 2.0, 50.0], 1.0, 10.0).unwrap();
/// assert_eq!(union.grid(), &[1.0, 2.0, 5.0, 10.0]);
///
/// // merging only ever adds points within the range
/// union.merge(&[3.0, 5.0, 20.0]);
/// assert_eq!(union.grid(), &[1.0, 2.0, 3.0, 5.0, 10.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionGrid {
    grid: Vec<f64>,
    min: f64,
    max: f64,
}

impl UnionGrid {
    /// Seed a union grid, keeping only the seed points within `[min, max]`
    ///
    /// The exact end points are always included.
    pub fn initialize(seed: &[f64], min: f64, max: f64) -> Result<Self> {
        if !(min < max) || !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidBounds { min, max });
        }

        let grid = seed
            .iter()
            .copied()
            .filter(|x| *x > min && *x < max)
            .chain([min, max])
            .sorted_by(f64::total_cmp)
            .dedup()
            .collect();

        Ok(Self { grid, min, max })
    }

    /// Current grid points
    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    /// Lower end point
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper end point
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// Never true, the end points are always present
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Take ownership of the grid points
    pub fn into_inner(self) -> Vec<f64> {
        self.grid
    }

    /// Insert every point of `points` within range, by value
    ///
    /// Existing points are never removed.
    pub fn merge(&mut self, points: &[f64]) {
        let (min, max) = (self.min, self.max);
        let merged: Vec<f64> = self
            .grid
            .drain(..)
            .chain(points.iter().copied().filter(|x| *x >= min && *x <= max))
            .sorted_by(f64::total_cmp)
            .dedup()
            .collect();
        self.grid = merged;
    }

    /// Refine the union grid in place against a single function
    pub fn generate_in_place<F>(&mut self, generator: &GridGenerator, f: F) -> Result<Convergence>
    where
        F: Fn(f64) -> f64,
    {
        generator.generate_in_place(&mut self.grid, f)
    }

    /// Refine the union grid against every function with one generator
    pub fn generate_all<F>(
        &mut self,
        generator: &GridGenerator,
        evaluators: &[F],
    ) -> Result<Convergence>
    where
        F: Fn(f64) -> f64 + Sync,
    {
        let pairs = evaluators
            .iter()
            .map(|f| (*generator, f))
            .collect::<Vec<_>>();
        self.generate_each(&pairs)
    }

    /// Refine the union grid against every function, each with its own generator
    ///
    /// Each function refines its own copy of the current grid in parallel,
    /// and the results are merged in order. A final sequential pass over
    /// every function makes sure the merged grid satisfies all of them at
    /// once, which also makes the result independent of the order of the
    /// functions within the distance tolerance.
    ///
    /// ```rust
    /// # use xsgrid_grid::{ConvergenceCriteria, GridGenerator, UnionGrid};
    /// # use xsgrid_interp::InterpPolicy;
    /// let fine = GridGenerator::new(InterpPolicy::LIN_LIN, ConvergenceCriteria::default()).unwrap();
    /// let coarse = GridGenerator::new(
    ///     InterpPolicy::LIN_LIN,
    ///     ConvergenceCriteria { convergence_tol: 0.5, ..Default::default() },
    /// )
    /// .unwrap();
    ///
    /// let mut union = UnionGrid::initialize(&[], 1.0, 5.0).unwrap();
    /// union.generate_each(&[(coarse, |x: f64| x * x * x)]).unwrap();
    /// let coarse_len = union.len();
    ///
    /// let mut union = UnionGrid::initialize(&[], 1.0, 5.0).unwrap();
    /// union.generate_each(&[(fine, |x: f64| x * x * x)]).unwrap();
    /// assert!(union.len() > coarse_len);
    /// ```
    pub fn generate_each<F>(&mut self, evaluators: &[(GridGenerator, F)]) -> Result<Convergence>
    where
        F: Fn(f64) -> f64 + Sync,
    {
        let seed = &self.grid;
        let refined = evaluators
            .par_iter()
            .map(|(generator, f)| generator.generate(seed, f))
            .collect::<Result<Vec<_>>>()?;

        let mut status = Convergence::Converged;
        for (grid, grid_status) in refined {
            self.merge(&grid);
            status = status.and(grid_status);
        }
        debug!("Merged {} grids into {} points", evaluators.len(), self.len());

        for (generator, f) in evaluators {
            status = status.and(self.generate_in_place(generator, f)?);
        }

        Ok(status)
    }

    /// Evaluate a function on the grid, stripping the leading zeros
    ///
    /// Returns the values from the threshold onwards and the threshold index
    /// into the grid. A function that is zero everywhere keeps only its last
    /// point.
    ///
    /// ```rust
    /// # use xsgrid_grid::UnionGrid;
    /// let union = UnionGrid::initialize(&[2.0, 3.0], 1.0, 4.0).unwrap();
    /// let (values, threshold) = union.evaluate_with_threshold(|x| (x - 2.5).max(0.0)).unwrap();
    /// assert_eq!(threshold, 2);
    /// assert_eq!(values, vec![0.5, 1.5]);
    /// ```
    pub fn evaluate_with_threshold<F>(&self, f: F) -> Result<(Vec<f64>, usize)>
    where
        F: Fn(f64) -> f64,
    {
        let values = self
            .grid
            .iter()
            .map(|x| match f(*x) {
                value if value.is_finite() => Ok(value),
                value => Err(Error::NonFiniteEvaluation { x: *x, value }),
            })
            .collect::<Result<Vec<f64>>>()?;

        let threshold = values
            .iter()
            .position(|v| *v != 0.0)
            .unwrap_or(values.len() - 1);

        Ok((values[threshold..].to_vec(), threshold))
    }
}
