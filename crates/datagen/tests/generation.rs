//! Integration tests for adjoint data generation

use approx::assert_relative_eq;
use rstest::{fixture, rstest};
use xsgrid_datagen::{
    AdjointDataGenerator, AdjointTable, Bremsstrahlung, Electroionization, Error, ForwardData,
    ForwardTable, GeneratorConfig, Quantity, QuantityConfig, UnionGridMode,
};
use xsgrid_interp::TwoDPolicy;

#[fixture]
fn forward() -> ForwardTable {
    let mut forward = ForwardTable::new(vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    forward.insert(
        Quantity::TotalElastic,
        0,
        vec![7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0],
    );
    forward.insert(Quantity::Bremsstrahlung, 3, vec![1.0, 2.0, 3.0, 4.0]);
    forward.insert(Quantity::Electroionization(1), 6, vec![1.0]);
    forward
}

fn config(mode: UnionGridMode) -> GeneratorConfig {
    GeneratorConfig {
        union_grid: mode,
        ..GeneratorConfig::new(1.0, 5.0)
    }
}

#[rstest]
fn reuse_forward_grid(forward: ForwardTable) {
    let generator = AdjointDataGenerator::new(&forward, config(UnionGridMode::ReuseForward))
        .unwrap()
        .with_cross_section(Quantity::AtomicExcitation, |e| (e - 2.5).max(0.0));

    let mut adjoint = AdjointTable::default();
    generator.populate(&mut adjoint).unwrap();

    assert_eq!(adjoint.energy_grid, vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    // sliced to the energy limits
    let elastic = adjoint.cross_section(&Quantity::TotalElastic).unwrap();
    assert_eq!(elastic.threshold, 0);
    assert_eq!(elastic.values, vec![6.0, 5.0, 4.0, 3.0, 2.0]);

    // threshold relative to the start of the slice
    let bremsstrahlung = adjoint.cross_section(&Quantity::Bremsstrahlung).unwrap();
    assert_eq!(bremsstrahlung.threshold, 2);
    assert_eq!(bremsstrahlung.values, vec![1.0, 2.0, 3.0]);

    // threshold above the maximum energy
    assert!(adjoint
        .cross_section(&Quantity::Electroionization(1))
        .is_none());

    // evaluated with leading zeros stripped
    let excitation = adjoint.cross_section(&Quantity::AtomicExcitation).unwrap();
    assert_eq!(excitation.threshold, 2);
    assert_eq!(excitation.values, vec![0.5, 1.5, 2.5]);
}

#[rstest]
#[case(1.0, 5.0, vec![0.5, 1.5, 2.0, 3.0, 6.0], 3)]
#[case(1.6, 2.5, vec![1.5, 2.0, 3.0], 2)]
#[case(2.0, 3.0, vec![2.0, 3.0], 1)]
fn reuse_forward_grid_brackets_energy_limits(
    #[case] min: f64,
    #[case] max: f64,
    #[case] expected: Vec<f64>,
    #[case] bremsstrahlung_threshold: usize,
) {
    let mut forward = ForwardTable::new(vec![0.5, 1.5, 2.0, 3.0, 6.0]);
    forward.insert(Quantity::TotalElastic, 0, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    forward.insert(Quantity::Bremsstrahlung, 3, vec![1.0, 2.0]);

    let config = GeneratorConfig {
        union_grid: UnionGridMode::ReuseForward,
        ..GeneratorConfig::new(min, max)
    };
    let mut adjoint = AdjointTable::default();
    AdjointDataGenerator::new(&forward, config)
        .unwrap()
        .populate(&mut adjoint)
        .unwrap();

    let grid = &adjoint.energy_grid;
    assert_eq!(grid, &expected);
    assert!(grid[0] <= min);
    assert!(grid[grid.len() - 1] >= max);

    let elastic = adjoint.cross_section(&Quantity::TotalElastic).unwrap();
    assert_eq!(elastic.threshold, 0);
    assert_eq!(elastic.values.len(), grid.len());

    let bremsstrahlung = adjoint.cross_section(&Quantity::Bremsstrahlung).unwrap();
    assert_eq!(bremsstrahlung.threshold, bremsstrahlung_threshold);
    assert_eq!(grid[bremsstrahlung.threshold], 3.0);
    assert_eq!(bremsstrahlung.values[0], 1.0);
}

#[test]
fn union_grid_uses_quantity_tolerances() {
    let mut forward = ForwardTable::new(vec![1.0, 3.0, 5.0]);
    forward.insert(Quantity::TotalElastic, 0, vec![1.0, 1.0, 1.0]);

    let union_length = |config: GeneratorConfig| {
        let mut adjoint = AdjointTable::default();
        AdjointDataGenerator::new(&forward, config)
            .unwrap()
            .with_cross_section(Quantity::AtomicExcitation, |e| e * e * e)
            .populate(&mut adjoint)
            .unwrap();
        adjoint.energy_grid.len()
    };

    let mut coarse = GeneratorConfig::new(1.0, 5.0);
    coarse.overrides.insert(
        Quantity::AtomicExcitation,
        QuantityConfig {
            grid_convergence_tol: 0.5,
            ..Default::default()
        },
    );

    let default_length = union_length(GeneratorConfig::new(1.0, 5.0));
    let coarse_length = union_length(coarse);
    assert!(coarse_length >= 3);
    assert!(coarse_length < default_length);
}

#[rstest]
fn recalculate_union_grid(forward: ForwardTable) {
    let generator = AdjointDataGenerator::new(&forward, config(UnionGridMode::Recalculate))
        .unwrap()
        .with_cross_section(Quantity::AtomicExcitation, |e| e * e);

    let mut adjoint = AdjointTable::default();
    generator.populate(&mut adjoint).unwrap();

    let grid = &adjoint.energy_grid;
    assert_eq!(grid[0], 1.0);
    assert_eq!(grid[grid.len() - 1], 5.0);
    assert!(grid.windows(2).all(|w| w[0] < w[1]));

    // forward grid points are kept and the grid is refined for e^2
    for e in [2.0, 3.0, 4.0] {
        assert!(grid.contains(&e));
    }
    assert!(grid.len() > 5);

    // carried over forward cross sections are interpolated onto the new grid
    let elastic = adjoint.cross_section(&Quantity::TotalElastic).unwrap();
    assert_eq!(elastic.threshold, 0);
    assert_eq!(elastic.values.len(), grid.len());
    for (e, value) in grid.iter().zip(&elastic.values) {
        assert_relative_eq!(*value, 7.0 - e, max_relative = 1e-12);
    }

    // bremsstrahlung is zero below its forward threshold
    let bremsstrahlung = adjoint.cross_section(&Quantity::Bremsstrahlung).unwrap();
    assert_eq!(grid[bremsstrahlung.threshold], 3.0);

    // and electroionization is zero everywhere, keeping only the last point
    let ionization = adjoint
        .cross_section(&Quantity::Electroionization(1))
        .unwrap();
    assert_eq!(ionization.threshold, grid.len() - 1);
    assert_eq!(ionization.values, vec![0.0]);
}

#[rstest]
fn failed_quantity_writes_nothing(forward: ForwardTable) {
    let generator = AdjointDataGenerator::new(&forward, config(UnionGridMode::ReuseForward))
        .unwrap()
        .with_cross_section(Quantity::AtomicExcitation, |e| {
            if e > 3.0 {
                f64::NAN
            } else {
                e
            }
        });

    let mut adjoint = AdjointTable::default();
    let result = generator.populate(&mut adjoint);

    assert!(matches!(
        result,
        Err(Error::Quantity {
            quantity: Quantity::AtomicExcitation,
            ..
        })
    ));
    assert!(adjoint.is_empty());
}

#[rstest]
fn inverted_boundary_writes_nothing(forward: ForwardTable) {
    let generator = AdjointDataGenerator::new(&forward, config(UnionGridMode::Recalculate))
        .unwrap()
        .with_distribution(
            Quantity::Electroionization(1),
            TwoDPolicy::LIN_LIN_LIN,
            Electroionization {
                binding_energy: 1.0,
            },
            |_, _| 1.0,
        )
        .unwrap();

    let mut adjoint = AdjointTable::default();
    let Err(Error::Quantity { quantity, source }) = generator.populate(&mut adjoint) else {
        panic!("expected the electroionization distribution to fail");
    };

    assert_eq!(quantity, Quantity::Electroionization(1));
    assert!(matches!(*source, Error::InvertedBoundary { .. }));
    assert!(adjoint.is_empty());
}

#[rstest]
fn invalid_config(forward: ForwardTable) {
    assert!(matches!(
        AdjointDataGenerator::new(&forward, GeneratorConfig::new(5.0, 1.0)),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn empty_forward_grid() {
    let forward = ForwardTable::new(vec![10.0, 20.0]);
    let generator =
        AdjointDataGenerator::new(&forward, config(UnionGridMode::ReuseForward)).unwrap();

    assert!(matches!(
        generator.populate(&mut AdjointTable::default()),
        Err(Error::EmptyForwardData { .. })
    ));
}

#[test]
fn distributions_on_the_union_grid() {
    let mut forward = ForwardTable::new(vec![1.0, 3.0, 5.0]);
    forward.insert(Quantity::TotalElastic, 0, vec![1.0, 1.0, 1.0]);

    let generator = AdjointDataGenerator::new(&forward, GeneratorConfig::new(1.0, 5.0))
        .unwrap()
        .with_distribution(
            Quantity::Bremsstrahlung,
            TwoDPolicy::LIN_LIN_LIN,
            Bremsstrahlung,
            |energy, outgoing| outgoing - energy,
        )
        .unwrap();

    let mut adjoint = AdjointTable::default();
    generator.populate(&mut adjoint).unwrap();

    let table = adjoint.two_d(&Quantity::Bremsstrahlung).unwrap();
    assert!(table.validate().is_ok());
    assert_eq!(table.primary, vec![1.0, 3.0, 5.0]);

    let upper = generator.config().max_table_energy();
    for (energy, (grid, values)) in table
        .primary
        .iter()
        .zip(table.secondary.iter().zip(&table.values))
    {
        assert_eq!(grid[0], *energy);
        assert_eq!(values[0], 0.0);
        assert_eq!(grid[grid.len() - 1], upper);
        assert_relative_eq!(values[values.len() - 1], upper - energy, max_relative = 1e-12);
    }
}

#[test]
fn update_reuses_previous_grids() {
    let mut forward = ForwardTable::new(vec![1.0, 3.0, 5.0]);
    forward.insert(Quantity::TotalElastic, 0, vec![1.0, 1.0, 1.0]);
    let distribution = |scale: f64| {
        AdjointDataGenerator::new(&forward, GeneratorConfig::new(1.0, 5.0))
            .unwrap()
            .with_distribution(
                Quantity::Bremsstrahlung,
                TwoDPolicy::LIN_LIN_LIN,
                Bremsstrahlung,
                move |energy, outgoing| scale * (outgoing - energy),
            )
            .unwrap()
    };

    let mut previous = AdjointTable::default();
    distribution(1.0).populate(&mut previous).unwrap();
    let old = previous.two_d(&Quantity::Bremsstrahlung).unwrap();
    assert_eq!(old.primary, forward.union_energy_grid());

    // a different function shows which points were regenerated
    let mut updated = AdjointTable::default();
    distribution(2.0)
        .update(&previous, &[1.0, 2.0, 3.0, 4.0, 5.0], &mut updated)
        .unwrap();

    assert!(updated.energy_grid.is_empty());
    let new = updated.two_d(&Quantity::Bremsstrahlung).unwrap();
    assert_eq!(new.primary, vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    for (i, j) in [(0, 0), (2, 1), (4, 2)] {
        assert_eq!(new.secondary[i], old.secondary[j]);
        assert_eq!(new.values[i], old.values[j]);
    }

    let upper = GeneratorConfig::new(1.0, 5.0).max_table_energy();
    for (i, energy) in [(1, 2.0), (3, 4.0)] {
        let last = new.values[i].len() - 1;
        assert_relative_eq!(new.values[i][last], 2.0 * (upper - energy), max_relative = 1e-12);
    }
}

#[rstest]
fn tables_round_trip_through_json_files(forward: ForwardTable) {
    let path = std::env::temp_dir().join("xsgrid-datagen-forward.json");
    forward.write_json(&path).unwrap();
    let read = ForwardTable::read_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(read, forward);
    assert_eq!(read.subshells(), vec![1]);
}
