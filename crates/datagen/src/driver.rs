//! Adjoint data generation from forward data

// external crates
use log::{debug, info, warn};

// xsgrid modules
use xsgrid_grid::{GridGenerator, TwoDGrid, UnionGrid};
use xsgrid_interp::{InterpPolicy, TwoDPolicy};

// internal modules
use crate::config::{GeneratorConfig, UnionGridMode};
use crate::container::{AdjointData, AdjointTable, ForwardData};
use crate::error::{Error, Result};
use crate::quantity::Quantity;
use crate::tabular::Tabular;
use crate::two_variable::{Boundaries, TwoVariableGridGenerator};

/// Cross section as a function of energy
pub type CrossSectionFn<'a> = Box<dyn Fn(f64) -> f64 + Sync + 'a>;

/// Two variable distribution as a function of energy and outgoing energy
pub type DistributionFn<'a> = Box<dyn Fn(f64, f64) -> f64 + Sync + 'a>;

/// Registered two dimensional quantity
struct TwoDQuantity<'a> {
    generator: TwoVariableGridGenerator<Box<dyn Boundaries + Sync + 'a>>,
    distribution: DistributionFn<'a>,
}

/// Everything generated in a run, held back until every quantity succeeds
#[derive(Debug, Default)]
struct Staged {
    energy_grid: Option<Vec<f64>>,
    cross_sections: Vec<(Quantity, Vec<f64>, usize)>,
    two_d: Vec<(Quantity, TwoDGrid)>,
}

impl Staged {
    fn write<A: AdjointData + ?Sized>(self, out: &mut A) {
        if let Some(grid) = self.energy_grid {
            out.set_energy_grid(grid);
        }
        for (quantity, values, threshold) in self.cross_sections {
            out.set_cross_section(quantity, values, threshold);
        }
        for (quantity, table) in self.two_d {
            out.set_two_d(quantity, table);
        }
    }
}

/// Generates adjoint data on a union energy grid
///
/// Forward cross sections are read through [ForwardData]. Adjoint cross
/// sections and two dimensional distributions are registered as evaluators,
/// and any forward cross section without an adjoint evaluator is carried over
/// as it is tabulated.
///
/// Results are only written once every quantity has been generated, so a
/// failure never leaves partial data behind.
///
/// ```rust
/// # use xsgrid_datagen::{
/// #     AdjointDataGenerator, AdjointTable, ForwardTable, GeneratorConfig, Quantity,
/// # };
/// let mut forward = ForwardTable::new(vec![1.0, 5.0, 10.0]);
/// forward.insert(Quantity::TotalElastic, 0, vec![1.0, 5.0, 10.0]);
///
/// let generator = AdjointDataGenerator::new(&forward, GeneratorConfig::new(1.0, 10.0))
///     .unwrap()
///     .with_cross_section(Quantity::AtomicExcitation, |e| (e - 2.0).max(0.0));
///
/// let mut adjoint = AdjointTable::default();
/// generator.populate(&mut adjoint).unwrap();
///
/// let excitation = adjoint.cross_section(&Quantity::AtomicExcitation).unwrap();
/// assert_eq!(adjoint.energy_grid[excitation.threshold - 1], 2.0);
/// assert!(adjoint.cross_section(&Quantity::TotalElastic).is_some());
/// ```
pub struct AdjointDataGenerator<'a, D: ?Sized> {
    forward: &'a D,
    config: GeneratorConfig,
    cross_sections: Vec<(Quantity, CrossSectionFn<'a>)>,
    distributions: Vec<(Quantity, TwoDQuantity<'a>)>,
}

impl<'a, D: ForwardData + ?Sized> AdjointDataGenerator<'a, D> {
    /// New generator with validated settings
    pub fn new(forward: &'a D, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            forward,
            config,
            cross_sections: Vec::new(),
            distributions: Vec::new(),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Register an adjoint cross section, replacing any previous evaluator
    pub fn with_cross_section<F>(mut self, quantity: Quantity, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Sync + 'a,
    {
        self.cross_sections.retain(|(q, _)| *q != quantity);
        self.cross_sections.push((quantity, Box::new(f)));
        self
    }

    /// Register a two dimensional distribution between kinematic boundaries
    pub fn with_distribution<B, F>(
        mut self,
        quantity: Quantity,
        policy: TwoDPolicy,
        boundaries: B,
        f: F,
    ) -> Result<Self>
    where
        B: Boundaries + Sync + 'a,
        F: Fn(f64, f64) -> f64 + Sync + 'a,
    {
        let boundaries: Box<dyn Boundaries + Sync + 'a> = Box::new(boundaries);
        let generator = TwoVariableGridGenerator::new(
            policy,
            boundaries,
            self.config.quantity(&quantity),
            self.config.max_table_energy(),
        )
        .map_err(|e| e.for_quantity(quantity))?
        .with_strict(self.config.strict)
        .with_verbose(self.config.verbose)
        .with_progress(self.config.progress);

        self.distributions.retain(|(q, _)| *q != quantity);
        self.distributions.push((
            quantity,
            TwoDQuantity {
                generator,
                distribution: Box::new(f),
            },
        ));
        Ok(self)
    }

    /// Generate every quantity and write them to `out`
    ///
    /// Nothing is written unless every quantity succeeds.
    pub fn populate<A: AdjointData + ?Sized>(&self, out: &mut A) -> Result<()> {
        let mut staged = Staged::default();

        info!("Creating union energy grid ({:?})", self.config.union_grid);
        let union = match self.config.union_grid {
            UnionGridMode::Recalculate => self.recalculate_union_grid()?,
            UnionGridMode::ReuseForward => self.reuse_forward_grid(&mut staged)?,
        };
        info!("Union energy grid has {} points", union.len());

        let carry_over = self.config.union_grid == UnionGridMode::Recalculate;
        for (quantity, f) in self.one_d_evaluators(carry_over)? {
            info!("   Setting the adjoint {quantity} cross section");
            let (values, threshold) = union
                .evaluate_with_threshold(f)
                .map_err(|e| Error::from(e).for_quantity(quantity))?;
            staged.cross_sections.push((quantity, values, threshold));
        }

        for (quantity, two_d) in &self.distributions {
            info!("   Setting the adjoint {quantity} distribution");
            let table = two_d
                .generator
                .generate_on_primary(union.grid(), &two_d.distribution)
                .map_err(|e| e.for_quantity(*quantity))?;
            staged.two_d.push((*quantity, table));
        }

        staged.energy_grid = Some(union.into_inner());
        staged.write(out);
        info!("Adjoint data generation complete");
        Ok(())
    }

    /// Regenerate every distribution on an enlarged primary grid
    ///
    /// Secondary grids already in `previous` are reused where the primary
    /// points match. Only the distributions are written.
    pub fn update<A: AdjointData + ?Sized>(
        &self,
        previous: &AdjointTable,
        enlarged: &[f64],
        out: &mut A,
    ) -> Result<()> {
        let mut staged = Staged::default();

        for (quantity, two_d) in &self.distributions {
            info!("   Updating the adjoint {quantity} distribution");
            let table = match previous.two_d(quantity) {
                Some(table) => two_d.generator.update_on_enlarged_primary(
                    table,
                    enlarged,
                    &two_d.distribution,
                ),
                None => two_d
                    .generator
                    .generate_on_primary(enlarged, &two_d.distribution),
            }
            .map_err(|e| e.for_quantity(*quantity))?;
            staged.two_d.push((*quantity, table));
        }

        staged.write(out);
        Ok(())
    }

    /// Refine a new union grid against every cross section
    fn recalculate_union_grid(&self) -> Result<UnionGrid> {
        let (min, max) = (self.config.min_energy, self.config.max_energy);

        let seed = self
            .forward
            .quantities()
            .iter()
            .filter_map(|q| self.forward.energy_grid(q))
            .flatten()
            .copied()
            .collect::<Vec<f64>>();
        let mut union = UnionGrid::initialize(&seed, min, max)?;
        debug!("Seeded union energy grid with {} points", union.len());

        // every quantity refines with its own tolerances
        let evaluators = self.one_d_evaluators(true)?;
        let refiners = evaluators
            .iter()
            .map(|(quantity, f)| {
                let criteria = self.config.quantity(quantity).grid_criteria();
                let generator = GridGenerator::new(InterpPolicy::LIN_LIN, criteria)
                    .map_err(|e| Error::from(e).for_quantity(*quantity))?
                    .with_strict(self.config.strict);
                Ok((generator, f))
            })
            .collect::<Result<Vec<_>>>()?;

        let status = union.generate_each(&refiners)?;

        if status.is_dirty() {
            warn!("Union energy grid {status}");
        }
        Ok(union)
    }

    /// Slice the forward union grid around the energy limits
    ///
    /// The slice runs from the last point at or below the minimum energy to
    /// the first point at or above the maximum, so both limits stay on the
    /// grid. Forward cross sections without an adjoint evaluator are sliced
    /// to match, with their threshold indices relative to the slice.
    fn reuse_forward_grid(&self, staged: &mut Staged) -> Result<UnionGrid> {
        let (min, max) = (self.config.min_energy, self.config.max_energy);
        let grid = self.forward.union_energy_grid();

        let start = grid.partition_point(|e| *e <= min).saturating_sub(1);
        let end = (grid.partition_point(|e| *e < max) + 1).min(grid.len());
        if end < start + 2 {
            return Err(Error::EmptyForwardData { min, max });
        }

        for quantity in self.carried_over() {
            let (Some(threshold), Some(values)) = (
                self.forward.threshold_index(&quantity),
                self.forward.cross_section(&quantity),
            ) else {
                return Err(Error::MissingForwardData(quantity));
            };

            if threshold >= end {
                warn!("No {quantity} cross section below {max}, skipping");
                continue;
            }

            let first = threshold.max(start);
            let values = values
                .get(first - threshold..end - threshold)
                .ok_or(Error::MissingForwardData(quantity))?;

            info!("   Setting the adjoint {quantity} cross section");
            staged
                .cross_sections
                .push((quantity, values.to_vec(), first - start));
        }

        let slice = &grid[start..end];
        Ok(UnionGrid::initialize(slice, slice[0], slice[slice.len() - 1])?)
    }

    /// Forward cross sections without an adjoint evaluator
    fn carried_over(&self) -> Vec<Quantity> {
        self.forward
            .quantities()
            .into_iter()
            .filter(|q| !self.cross_sections.iter().any(|(r, _)| r == q))
            .collect()
    }

    /// Every one dimensional quantity to evaluate on the union grid
    ///
    /// Forward cross sections are only included when `carry_over` is set,
    /// otherwise they are taken directly from the forward data.
    fn one_d_evaluators(&self, carry_over: bool) -> Result<Vec<(Quantity, CrossSectionFn<'_>)>> {
        let mut evaluators: Vec<(Quantity, CrossSectionFn<'_>)> = Vec::new();

        if carry_over {
            for quantity in self.carried_over() {
                let tabular = Tabular::from_forward(self.forward, quantity)
                    .map_err(|e| e.for_quantity(quantity))?;
                evaluators.push((quantity, Box::new(move |x: f64| tabular.evaluate(x))));
            }
        }

        for (quantity, f) in &self.cross_sections {
            evaluators.push((*quantity, Box::new(move |x: f64| f(x))));
        }

        Ok(evaluators)
    }
}
