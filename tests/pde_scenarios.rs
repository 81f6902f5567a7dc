use std::f64::consts::PI;

use openferric_pde::core::{ConvectionDiffusionSolver, PdeError};
use openferric_pde::engines::pde::{
    BoundaryCondition, BoundarySide, ExplicitFiniteDifference, PdeCoefficients, PdeGrid1D,
    PdeProblem, RichardsonExtrapolation, ThetaMethodSolver,
};

const DIFFUSIVITY: f64 = 0.5;

fn max_abs_diff(values: &[f64], exact: impl Fn(usize) -> f64) -> f64 {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (v - exact(i)).abs())
        .fold(0.0, f64::max)
}

/// `df/dt = D f_xx` on `[0, 1]`, zero at both ends, `f(0, x) = sin(pi x)`.
fn diffusion_problem() -> PdeProblem {
    PdeProblem::new(
        PdeCoefficients::constant(-DIFFUSIVITY, 0.0, 0.0, |x| (PI * x).sin())
            .expect("valid coefficients"),
        BoundaryCondition::dirichlet_constant(0.0, 0.0).expect("lower boundary"),
        BoundaryCondition::dirichlet_constant(1.0, 0.0).expect("upper boundary"),
    )
    .expect("valid problem")
}

fn diffusion_exact(t: f64, x: f64) -> f64 {
    (-DIFFUSIVITY * PI * PI * t).exp() * (PI * x).sin()
}

#[test]
fn zero_operator_leaves_initial_condition_untouched() {
    let problem = PdeProblem::new(
        PdeCoefficients::constant(0.0, 0.0, 0.0, |x| x * x).expect("valid coefficients"),
        BoundaryCondition::dirichlet_constant(0.0, 0.0).expect("lower boundary"),
        BoundaryCondition::dirichlet_constant(1.0, 1.0).expect("upper boundary"),
    )
    .expect("valid problem");

    for theta in [0.0, 0.3, 0.5, 1.0] {
        let res = ThetaMethodSolver::new(theta)
            .expect("valid theta")
            .solve(&problem, 10, 20, 1.0)
            .expect("solve");
        let grid = res.grid().clone();
        let err = max_abs_diff(res.terminal_values(), |i| grid.space_node(i).powi(2));
        assert!(err < 1e-10, "theta {theta}: max error {err}");
    }
}

#[test]
fn constant_dirichlet_state_is_preserved_at_every_step() {
    const LEVEL: f64 = 2.5;
    let problem = PdeProblem::new(
        PdeCoefficients::constant(0.0, 0.0, 0.0, |_| LEVEL).expect("valid coefficients"),
        BoundaryCondition::dirichlet_constant(-1.0, LEVEL).expect("lower boundary"),
        BoundaryCondition::dirichlet_constant(1.0, LEVEL).expect("upper boundary"),
    )
    .expect("valid problem");

    for theta in [0.0, 0.5, 1.0] {
        let res = ThetaMethodSolver::new(theta)
            .expect("valid theta")
            .with_full_results(true)
            .solve(&problem, 8, 16, 1.0)
            .expect("solve");
        let full = res.as_full().expect("full results");
        for slice in full.slices() {
            assert!(max_abs_diff(slice, |_| LEVEL) < 1e-12);
        }
    }
}

#[test]
fn dirichlet_values_are_reproduced_exactly() {
    let t_max = 0.7;
    let problem = PdeProblem::new(
        PdeCoefficients::constant(-0.3, 0.2, 0.1, |x| 1.0 + x).expect("valid coefficients"),
        BoundaryCondition::dirichlet(0.0, |t| 1.0 + t).expect("lower boundary"),
        BoundaryCondition::dirichlet(1.0, |t| 2.0 - t * t).expect("upper boundary"),
    )
    .expect("valid problem");

    for theta in [0.0, 0.5, 1.0] {
        let res = ThetaMethodSolver::new(theta)
            .expect("valid theta")
            .solve(&problem, 80, 10, t_max)
            .expect("solve");
        let values = res.terminal_values();
        assert!((values[0] - (1.0 + t_max)).abs() < 1e-12);
        assert!((values[10] - (2.0 - t_max * t_max)).abs() < 1e-12);
    }
}

#[test]
fn crank_nicolson_converges_under_refinement() {
    let problem = diffusion_problem();
    let t_max = 0.2;
    let mut errors = Vec::new();
    for steps in [10, 20, 40] {
        let res = ThetaMethodSolver::crank_nicolson()
            .solve(&problem, steps, steps, t_max)
            .expect("solve");
        let grid = res.grid().clone();
        errors.push(max_abs_diff(res.terminal_values(), |i| {
            diffusion_exact(t_max, grid.space_node(i))
        }));
    }
    assert!(errors[1] < errors[0], "{errors:?}");
    assert!(errors[2] < errors[1], "{errors:?}");
    assert!(errors[2] < 1e-3, "{errors:?}");
}

#[test]
fn richardson_beats_both_inner_solves() {
    let problem = diffusion_problem();
    let t_max = 0.2;
    let mid = 100;
    let exact = diffusion_exact(t_max, 0.5);

    let implicit = ThetaMethodSolver::fully_implicit();
    let coarse = implicit.solve(&problem, 10, 200, t_max).expect("coarse solve");
    let fine = implicit.solve(&problem, 20, 200, t_max).expect("fine solve");
    let extrapolated = RichardsonExtrapolation::new(implicit)
        .solve(&problem, 10, 200, t_max)
        .expect("extrapolated solve");

    let coarse_err = (coarse.function_value(mid) - exact).abs();
    let fine_err = (fine.function_value(mid) - exact).abs();
    let extrapolated_err = (extrapolated.function_value(mid) - exact).abs();
    assert!(extrapolated_err < fine_err, "{extrapolated_err} vs {fine_err}");
    assert!(fine_err < coarse_err);
    assert!(extrapolated_err < 0.1 * fine_err);
}

#[test]
fn richardson_passes_the_free_boundary_to_both_inner_solves() {
    let floor = |x: f64| 0.8 * (PI * x).sin();
    let problem = diffusion_problem().with_free_boundary(move |_, x| floor(x));
    let base = ThetaMethodSolver::fully_implicit().with_full_results(true);
    let grid = PdeGrid1D::uniform(10, 20, 0.5, 0.0, 1.0).expect("grid");

    let coarse = base.solve_on_grid(&problem, &grid).expect("coarse solve");
    let fine = base
        .solve_on_grid(&problem, &grid.with_double_time_steps())
        .expect("fine solve");
    for res in [&coarse, &fine] {
        let full = res.as_full().expect("full results");
        for n in 1..full.num_time_nodes() {
            for (i, v) in full.time_slice(n).iter().enumerate() {
                assert!(*v >= floor(grid.space_node(i)), "slice {n}, node {i}");
            }
        }
    }

    let extrapolated = RichardsonExtrapolation::new(base)
        .solve_on_grid(&problem, &grid)
        .expect("extrapolated solve");
    for (i, v) in extrapolated.terminal_values().iter().enumerate() {
        assert!(v.is_finite(), "node {i}");
        let combined = 2.0 * fine.function_value(i) - coarse.function_value(i);
        assert!((v - combined).abs() < 1e-12, "node {i}: {v} vs {combined}");
        // By t = 0.5 unconstrained decay has pushed every node onto the floor.
        let g = floor(grid.space_node(i));
        assert!((v - g).abs() < 1e-9, "node {i}: {v} vs floor {g}");
    }
}

#[test]
fn convection_dominated_problem_solves_without_diverging() {
    let problem = PdeProblem::new(
        PdeCoefficients::constant(-0.001, 20.0, 0.0, |x| (x - 0.5).abs())
            .expect("valid coefficients"),
        BoundaryCondition::dirichlet_constant(0.0, 0.5).expect("lower boundary"),
        BoundaryCondition::dirichlet_constant(1.0, 0.5).expect("upper boundary"),
    )
    .expect("valid problem");
    let res = ThetaMethodSolver::default()
        .solve(&problem, 20, 50, 0.5)
        .expect("convection-dominated solve");
    let values = res.terminal_values();
    assert!(values.iter().all(|v| v.is_finite()));
    assert!((values[0] - 0.5).abs() < 1e-12);
    assert!((values[50] - 0.5).abs() < 1e-12);
}

#[test]
fn misplaced_boundary_level_is_rejected() {
    let problem = diffusion_problem();
    let grid = PdeGrid1D::uniform(10, 10, 0.1, 0.0, 1.5).expect("grid");
    assert!(matches!(
        ThetaMethodSolver::default().solve_on_grid(&problem, &grid),
        Err(PdeError::InvalidGrid(_))
    ));
    assert!(matches!(
        ExplicitFiniteDifference::new().solve_on_grid(&problem, &grid),
        Err(PdeError::InvalidGrid(_))
    ));
}

#[test]
fn explicit_solver_matches_crank_nicolson_when_stable() {
    let problem = diffusion_problem();
    // D dt / dx^2 = 0.125
    let explicit = ExplicitFiniteDifference::new()
        .solve(&problem, 500, 25, 0.2)
        .expect("explicit solve");
    let cn = ThetaMethodSolver::crank_nicolson()
        .solve(&problem, 500, 25, 0.2)
        .expect("theta solve");
    let err = max_abs_diff(explicit.terminal_values(), |i| cn.function_value(i));
    assert!(err < 1e-3, "max difference {err}");
}

#[test]
fn fixed_second_derivative_boundary_keeps_affine_solution() {
    // Any affine profile is steady for b = c = 0 and satisfies f_xx = 0.
    let problem = PdeProblem::new(
        PdeCoefficients::constant(-1.0, 0.0, 0.0, |x| 3.0 - 2.0 * x).expect("valid coefficients"),
        BoundaryCondition::dirichlet_constant(0.0, 3.0).expect("lower boundary"),
        BoundaryCondition::fixed_second_derivative(1.0, BoundarySide::Upper, 0.0)
            .expect("upper boundary"),
    )
    .expect("valid problem");
    let res = ThetaMethodSolver::default()
        .solve(&problem, 20, 20, 0.5)
        .expect("solve");
    let grid = res.grid().clone();
    let err = max_abs_diff(res.terminal_values(), |i| 3.0 - 2.0 * grid.space_node(i));
    assert!(err < 1e-8, "max error {err}");
}

#[test]
fn terminal_results_serialize_with_kind_tag() {
    let res = ThetaMethodSolver::default()
        .solve(&diffusion_problem(), 4, 4, 0.1)
        .expect("solve");
    let json = serde_json::to_value(&res).expect("serialize");
    assert_eq!(json["kind"], "terminal");
    assert_eq!(json["values"].as_array().map(Vec::len), Some(5));
}
