//! Forward and adjoint data containers
//!
//! The generator only needs to read forward data and write adjoint data, so
//! both sides are traits. [ForwardTable] and [AdjointTable] are simple
//! in-memory implementations that read from and write to JSON.

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

// external crates
use serde::{Deserialize, Serialize};

// xsgrid modules
use xsgrid_grid::TwoDGrid;

// internal modules
use crate::error::Result;
use crate::quantity::Quantity;

/// Read access to forward cross section data
///
/// Every cross section is tabulated on the union energy grid, starting from
/// its threshold index.
pub trait ForwardData {
    /// Energy grid shared by every forward cross section
    fn union_energy_grid(&self) -> &[f64];

    /// Cross section values from the threshold index onwards
    fn cross_section(&self, quantity: &Quantity) -> Option<&[f64]>;

    /// Index of the first union grid point a cross section is tabulated on
    fn threshold_index(&self, quantity: &Quantity) -> Option<usize>;

    /// Every tabulated quantity
    fn quantities(&self) -> Vec<Quantity>;

    /// Electroionization subshells
    fn subshells(&self) -> Vec<u32> {
        self.quantities()
            .into_iter()
            .filter_map(|q| match q {
                Quantity::Electroionization(subshell) => Some(subshell),
                _ => None,
            })
            .collect()
    }

    /// Energy grid a single cross section is tabulated on
    fn energy_grid(&self, quantity: &Quantity) -> Option<&[f64]> {
        self.union_energy_grid()
            .get(self.threshold_index(quantity)?..)
    }
}

/// Write access to adjoint data
pub trait AdjointData {
    /// Set the union energy grid of every one dimensional cross section
    fn set_energy_grid(&mut self, grid: Vec<f64>);

    /// Set a cross section tabulated from `threshold` on the energy grid
    fn set_cross_section(&mut self, quantity: Quantity, values: Vec<f64>, threshold: usize);

    /// Set a two dimensional table
    fn set_two_d(&mut self, quantity: Quantity, table: TwoDGrid);
}

/// Cross section values and the grid index they start from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    pub threshold: usize,
    pub values: Vec<f64>,
}

/// In-memory forward data
///
/// ```rust
/// # use xsgrid_datagen::{ForwardData, ForwardTable, Quantity};
/// let mut table = ForwardTable::new(vec![1.0, 2.0, 3.0]);
/// table.insert(Quantity::Bremsstrahlung, 1, vec![5.0, 6.0]);
///
/// let grid = table.energy_grid(&Quantity::Bremsstrahlung).unwrap();
/// assert_eq!(grid, &[2.0, 3.0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardTable {
    pub union_energy_grid: Vec<f64>,
    pub cross_sections: BTreeMap<Quantity, CrossSection>,
}

impl ForwardTable {
    pub fn new(union_energy_grid: Vec<f64>) -> Self {
        Self {
            union_energy_grid,
            cross_sections: BTreeMap::new(),
        }
    }

    /// Add or replace a cross section
    pub fn insert(&mut self, quantity: Quantity, threshold: usize, values: Vec<f64>) {
        self.cross_sections
            .insert(quantity, CrossSection { threshold, values });
    }

    /// Read forward data from a JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write forward data to a JSON file
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }
}

impl ForwardData for ForwardTable {
    fn union_energy_grid(&self) -> &[f64] {
        &self.union_energy_grid
    }

    fn cross_section(&self, quantity: &Quantity) -> Option<&[f64]> {
        self.cross_sections
            .get(quantity)
            .map(|xs| xs.values.as_slice())
    }

    fn threshold_index(&self, quantity: &Quantity) -> Option<usize> {
        self.cross_sections.get(quantity).map(|xs| xs.threshold)
    }

    fn quantities(&self) -> Vec<Quantity> {
        self.cross_sections.keys().copied().collect()
    }
}

/// In-memory adjoint data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjointTable {
    pub energy_grid: Vec<f64>,
    pub cross_sections: BTreeMap<Quantity, CrossSection>,
    pub two_d: BTreeMap<Quantity, TwoDGrid>,
}

impl AdjointTable {
    pub fn cross_section(&self, quantity: &Quantity) -> Option<&CrossSection> {
        self.cross_sections.get(quantity)
    }

    pub fn two_d(&self, quantity: &Quantity) -> Option<&TwoDGrid> {
        self.two_d.get(quantity)
    }

    /// Nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.energy_grid.is_empty() && self.cross_sections.is_empty() && self.two_d.is_empty()
    }

    /// Read adjoint data from a JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write adjoint data to a JSON file
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }
}

impl AdjointData for AdjointTable {
    fn set_energy_grid(&mut self, grid: Vec<f64>) {
        self.energy_grid = grid;
    }

    fn set_cross_section(&mut self, quantity: Quantity, values: Vec<f64>, threshold: usize) {
        self.cross_sections
            .insert(quantity, CrossSection { threshold, values });
    }

    fn set_two_d(&mut self, quantity: Quantity, table: TwoDGrid) {
        self.two_d.insert(quantity, table);
    }
}
