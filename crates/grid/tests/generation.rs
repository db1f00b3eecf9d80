//! Integration tests for adaptive grid generation

use approx::assert_abs_diff_eq;
use rstest::{fixture, rstest};
use xsgrid_grid::{
    Convergence, ConvergenceCriteria, Error, GridGenerator, SecondaryGridInitializer, TwoDGrid,
    TwoDGridGenerator, UnionGrid,
};
use xsgrid_interp::{InterpPolicy, TwoDPolicy};

fn x2(x: f64) -> f64 {
    x * x
}

fn cube(x: f64) -> f64 {
    (x - 2.0) * (x - 2.0) * (x - 2.0)
}

/// x cos(x) on [-1, 1], zero everywhere else
fn x_cos_x(x: f64) -> f64 {
    if (-1.0..=1.0).contains(&x) {
        x * x.cos()
    } else {
        0.0
    }
}

fn generator(policy: InterpPolicy) -> GridGenerator {
    GridGenerator::new(policy, ConvergenceCriteria::new(1e-3, 1e-12, 1e-14).unwrap()).unwrap()
}

#[fixture]
fn lin_lin() -> GridGenerator {
    generator(InterpPolicy::LIN_LIN)
}

#[rstest]
#[case(InterpPolicy::LIN_LIN, vec![0.0, 10.0], x2 as fn(f64) -> f64, 321)]
#[case(InterpPolicy::LOG_LIN, vec![1e-3, 10.0], x2, 214)]
#[case(InterpPolicy::LIN_LIN, vec![1e-3, 10.0], f64::cos, 129)]
#[case(InterpPolicy::LIN_LIN, vec![0.0, 10.0], cube, 708)]
#[case(InterpPolicy::LOG_LIN, vec![2.0 + 1e-6, 10.0], cube, 266)]
#[case(
    InterpPolicy::LIN_LIN,
    vec![-2.0, -1.0 - 1e-15, -1.0, 0.0, 1.0, 1.0 + 1e-15, 2.0],
    x_cos_x,
    69
)]
fn generate(
    #[case] policy: InterpPolicy,
    #[case] initial: Vec<f64>,
    #[case] f: fn(f64) -> f64,
    #[case] expected: usize,
) {
    let refined = generator(policy).generate_and_evaluate(&initial, f).unwrap();

    assert_eq!(refined.grid.len(), expected);
    assert_eq!(refined.values.len(), expected);
    assert!(refined.grid.windows(2).all(|w| w[0] < w[1]));

    // end points and every initial point are kept
    assert_eq!(refined.grid[0], initial[0]);
    assert_eq!(refined.grid[expected - 1], initial[initial.len() - 1]);
    for x in &initial {
        assert!(refined.grid.contains(x));
    }
}

#[rstest]
#[case(InterpPolicy::LIN_LIN, vec![-1.0, 0.0, 10.0, 20.0], x2 as fn(f64) -> f64, (0.0, 10.0), 323)]
#[case(InterpPolicy::LOG_LIN, vec![1e-4, 1e-3, 10.0, 20.0], x2, (1e-3, 10.0), 216)]
#[case(InterpPolicy::LIN_LIN, vec![-1.0, 0.0, 10.0, 20.0], f64::cos, (0.0, 10.0), 131)]
#[case(InterpPolicy::LIN_LIN, vec![-1.0, 0.0, 10.0, 20.0], cube, (0.0, 10.0), 710)]
#[case(InterpPolicy::LOG_LIN, vec![2.0, 2.0 + 1e-6, 10.0, 20.0], cube, (2.0 + 1e-6, 10.0), 268)]
#[case(
    InterpPolicy::LIN_LIN,
    vec![-3.0, -2.0, -1.0 - 1e-15, -1.0, 0.0, 1.0, 1.0 + 1e-15, 2.0, 3.0],
    x_cos_x,
    (-2.0, 2.0),
    71
)]
fn refine_in_place(
    #[case] policy: InterpPolicy,
    #[case] initial: Vec<f64>,
    #[case] f: fn(f64) -> f64,
    #[case] window: (f64, f64),
    #[case] expected: usize,
) {
    let mut grid = initial.clone();
    generator(policy)
        .refine_in_place(&mut grid, f, window.0, window.1)
        .unwrap();

    assert_eq!(grid.len(), expected);
    assert!(grid.windows(2).all(|w| w[0] < w[1]));

    // nothing is added outside of the window
    let outside = |x: &&f64| **x < window.0 || **x > window.1;
    assert_eq!(
        grid.iter().filter(outside).collect::<Vec<_>>(),
        initial.iter().filter(outside).collect::<Vec<_>>()
    );
}

#[rstest]
fn window_is_clamped_to_grid(lin_lin: GridGenerator) {
    let mut clamped = vec![0.0, 10.0];
    let mut exact = vec![0.0, 10.0];

    lin_lin.refine_in_place(&mut clamped, x2, -5.0, 50.0).unwrap();
    lin_lin.generate_in_place(&mut exact, x2).unwrap();

    assert_eq!(clamped, exact);
}

#[rstest]
fn x2_on_unit_interval(lin_lin: GridGenerator) {
    let refined = lin_lin.generate_and_evaluate(&[0.0, 1.0], x2).unwrap();

    assert_eq!(refined.grid.len(), 257);
    assert_eq!(refined.grid[0], 0.0);
    assert_eq!(refined.grid[256], 1.0);

    // the relative error can never converge next to x = 0
    assert_eq!(refined.status, Convergence::DirtyConverged);
    assert!(matches!(
        lin_lin.with_strict(true).generate(&[0.0, 1.0], x2),
        Err(Error::DirtyConvergence { .. })
    ));
}

#[rstest]
#[case(1e-3)]
#[case(1e-6)]
fn x2_interpolant_within_tolerance(#[case] tol: f64) {
    let criteria = ConvergenceCriteria::new(tol, 1e-12, 1e-14).unwrap();
    let refined = GridGenerator::new(InterpPolicy::LIN_LIN, criteria)
        .unwrap()
        .generate_and_evaluate(&[0.0, 1.0], x2)
        .unwrap();

    for ((x0, x1), (y0, y1)) in refined
        .grid
        .windows(2)
        .map(|w| (w[0], w[1]))
        .zip(refined.values.windows(2).map(|w| (w[0], w[1])))
    {
        let x = 0.5 * (x0 + x1);
        assert_abs_diff_eq!(0.5 * (y0 + y1), x2(x), epsilon = tol);
    }
}

#[rstest]
fn clean_convergence_is_strict_safe(lin_lin: GridGenerator) {
    let strict = lin_lin.with_strict(true);
    let (grid, status) = strict.generate(&[1.0, 10.0], x2).unwrap();
    assert_eq!(status, Convergence::Converged);
    assert_eq!(grid.len(), 54);
}

#[rstest]
fn refinement_is_idempotent(lin_lin: GridGenerator) {
    let (grid, _) = lin_lin.generate(&[0.0, 10.0], x2).unwrap();
    let (again, _) = lin_lin.generate(&grid, x2).unwrap();
    assert_eq!(grid, again);
}

#[rstest]
fn union_is_order_independent(lin_lin: GridGenerator) {
    let forward: [fn(f64) -> f64; 3] = [x2, f64::recip, f64::exp];
    let reverse: [fn(f64) -> f64; 3] = [f64::exp, f64::recip, x2];

    let mut union_a = UnionGrid::initialize(&[2.0, 5.0], 1.0, 10.0).unwrap();
    let mut union_b = union_a.clone();

    union_a.generate_all(&lin_lin, &forward).unwrap();
    union_b.generate_all(&lin_lin, &reverse).unwrap();

    assert_eq!(union_a.grid(), union_b.grid());
    assert_eq!(union_a.grid()[0], 1.0);
    assert_eq!(union_a.grid()[union_a.len() - 1], 10.0);

    // every quantity is already converged on the union
    for f in forward {
        let mut grid = union_a.grid().to_vec();
        lin_lin.generate_in_place(&mut grid, f).unwrap();
        assert_eq!(grid.as_slice(), union_a.grid());
    }
}

struct FixedSecondary;

impl SecondaryGridInitializer for FixedSecondary {
    fn initialize_secondary_grid(&self, _primary: f64) -> xsgrid_grid::Result<Vec<f64>> {
        Ok(vec![1.0, 10.0, 20.0])
    }
}

fn two_d_generator(policy: TwoDPolicy) -> TwoDGridGenerator<FixedSecondary> {
    TwoDGridGenerator::new(
        policy,
        FixedSecondary,
        ConvergenceCriteria::default(),
        ConvergenceCriteria::default(),
    )
    .unwrap()
}

#[test]
fn two_d_linear_function_is_exact() {
    let generator = two_d_generator(TwoDPolicy::LIN_LIN_LIN)
        .with_strict(true)
        .with_verbose(true);

    let (table, status) = generator.generate(&[0.0, 10.0, 20.0], |x, y| x + y).unwrap();

    assert_eq!(status, Convergence::Converged);
    assert_eq!(table.primary, vec![0.0, 10.0, 20.0]);
    for (grid, values) in table.secondary.iter().zip(&table.values) {
        assert_eq!(grid, &vec![1.0, 10.0, 20.0]);
        assert_eq!(values.len(), 3);
    }
}

#[test]
fn two_d_refines_until_converged() {
    let generator = two_d_generator(TwoDPolicy::LIN_LIN_LIN);
    let f = |x: f64, y: f64| x * x + y * y;

    let (table, _) = generator.generate(&[0.0, 10.0, 20.0], f).unwrap();
    assert!(table.validate().is_ok());
    assert!(table.len() > 3);
    assert!(table.primary.windows(2).all(|w| w[0] < w[1]));

    // every secondary grid reproduces the function at its own points
    for ((x, grid), values) in table.primary.iter().zip(&table.secondary).zip(&table.values) {
        for (y, z) in grid.iter().zip(values) {
            assert_eq!(*z, f(*x, *y));
        }
    }

    // and the table is accurate between primary points
    let policy = generator.policy();
    for w in table.primary.windows(2) {
        let x = 0.5 * (w[0] + w[1]);
        let exact = f(x, 5.0);
        let estimate = table.evaluate(&policy, x, 5.0).unwrap();
        assert!((estimate - exact).abs() / exact <= 1e-2);
    }
}

#[test]
fn two_d_table_round_trips_through_json() {
    let table = TwoDGrid {
        primary: vec![1.0, 2.0],
        secondary: vec![vec![0.0, 1.0], vec![0.0, 2.0]],
        values: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
    };

    let json = serde_json::to_string(&table).unwrap();
    assert_eq!(serde_json::from_str::<TwoDGrid>(&json).unwrap(), table);
}
