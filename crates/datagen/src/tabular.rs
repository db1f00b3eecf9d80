// xsgrid modules
use xsgrid_interp::InterpPolicy;

// internal modules
use crate::container::ForwardData;
use crate::error::{Error, Result};
use crate::quantity::Quantity;

/// Evaluator for tabulated values, zero outside of the table
///
/// ```rust
/// # use xsgrid_datagen::Tabular;
/// # use xsgrid_interp::InterpPolicy;
/// let xs = Tabular::new(vec![1.0, 2.0], vec![10.0, 20.0], InterpPolicy::LIN_LIN).unwrap();
/// assert_eq!(xs.evaluate(1.5), 15.0);
/// assert_eq!(xs.evaluate(0.5), 0.0);
/// assert_eq!(xs.evaluate(2.5), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tabular {
    grid: Vec<f64>,
    values: Vec<f64>,
    policy: InterpPolicy,
}

impl Tabular {
    pub fn new(grid: Vec<f64>, values: Vec<f64>, policy: InterpPolicy) -> Result<Self> {
        // any problem with the table is caught here rather than on evaluation
        policy.evaluate_on_grid(&grid, &values, grid.first().copied().unwrap_or(f64::NAN))?;
        Ok(Self {
            grid,
            values,
            policy,
        })
    }

    /// Lin-lin evaluator for a forward cross section
    pub fn from_forward<D: ForwardData + ?Sized>(data: &D, quantity: Quantity) -> Result<Self> {
        let (Some(grid), Some(values)) = (data.energy_grid(&quantity), data.cross_section(&quantity))
        else {
            return Err(Error::MissingForwardData(quantity));
        };
        Self::new(grid.to_vec(), values.to_vec(), InterpPolicy::LIN_LIN)
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Interpolated value, zero outside of the tabulated range
    pub fn evaluate(&self, x: f64) -> f64 {
        self.policy
            .evaluate_on_grid(&self.grid, &self.values, x)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_tables() {
        assert!(Tabular::new(vec![], vec![], InterpPolicy::LIN_LIN).is_err());
        assert!(Tabular::new(vec![1.0, 2.0], vec![1.0], InterpPolicy::LIN_LIN).is_err());
    }

    #[test]
    fn exact_at_grid_points() {
        let xs = Tabular::new(vec![1.0, 2.0, 4.0], vec![1.0, 4.0, 16.0], InterpPolicy::LOG_LOG)
            .unwrap();
        assert_eq!(xs.evaluate(1.0), 1.0);
        assert_eq!(xs.evaluate(4.0), 16.0);
        assert!((xs.evaluate(3.0) - 9.0).abs() < 1e-12);
    }
}
