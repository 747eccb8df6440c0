//! Cross-checks between the evaluators on concrete hex worlds.

use hexworld_eval::{
    first_visit_monte_carlo, loopy_lookahead, recursive_policy_evaluation, solve_policy,
    EvalConfig, EvalError, MonteCarloConfig, ValueTable,
};
use hexworld_grid::{HexGrid, HexMove};
use hexworld_mdp::{Mdp, PolicyMatrix};
use proptest::prelude::*;

fn hex_world() -> HexGrid {
    let labels = vec![
        vec!["0", "0", "0", "0", "0", "0", "0", "0", "0", "0"],
        vec!["5", "0", "0", "X", "0", "0", "X", "X", "0", "0"],
        vec!["0", "0", "-10", "0", "X", "0", "0", "0", "X", "10"],
    ];
    HexGrid::uniform(&labels, HexMove::East).unwrap()
}

fn corridor() -> HexGrid {
    HexGrid::uniform(&[vec!["10", "0", "0", "0", "0", "10"]], HexMove::East).unwrap()
}

fn assert_close(a: &[f64], b: &[f64], tol: f64) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        if x.is_infinite() || y.is_infinite() {
            assert_eq!(x, y, "cell {i}");
        } else {
            assert!((x - y).abs() < tol, "cell {i}: {x} vs {y}");
        }
    }
}

#[test]
fn lookahead_matches_matrix_recursion() {
    for grid in [hex_world(), corridor()] {
        let mdp = Mdp::from_grid(&grid);
        let policy = PolicyMatrix::from_grid(&grid);
        for config in [
            EvalConfig::default(),
            EvalConfig::default().with_gamma(1.0).with_horizon(25),
        ] {
            let graph = loopy_lookahead(&grid, config).unwrap();
            let matrix = recursive_policy_evaluation(&mdp, &policy, config).unwrap();
            assert_close(&graph, &matrix, 1e-9);
        }
    }
}

#[test]
fn closed_form_is_limit_of_recursion() {
    for grid in [hex_world(), corridor()] {
        let mdp = Mdp::from_grid(&grid);
        let policy = PolicyMatrix::from_grid(&grid);
        let config = EvalConfig::default().with_gamma(0.9).with_horizon(300);
        let exact = solve_policy(&mdp, &policy, config).unwrap();
        let bounded = recursive_policy_evaluation(&mdp, &policy, config).unwrap();
        assert_close(&exact, &bounded, 1e-6);
    }
}

#[test]
fn deep_horizon_reaches_closed_form() {
    for grid in [hex_world(), corridor()] {
        let mdp = Mdp::from_grid(&grid);
        let policy = PolicyMatrix::from_grid(&grid);
        let config = EvalConfig::default().with_horizon(20_000);
        let exact = solve_policy(&mdp, &policy, config).unwrap();
        assert_close(&loopy_lookahead(&grid, config).unwrap(), &exact, 1e-6);
        assert_close(
            &recursive_policy_evaluation(&mdp, &policy, config).unwrap(),
            &exact,
            1e-6,
        );
    }
}

#[test]
fn oversized_horizon_is_rejected() {
    let grid = corridor();
    let mdp = Mdp::from_grid(&grid);
    let config = EvalConfig::default().with_horizon(usize::MAX);
    assert!(matches!(
        loopy_lookahead(&grid, config),
        Err(EvalError::InvalidConfig { .. })
    ));
    assert!(matches!(
        recursive_policy_evaluation(&mdp, &PolicyMatrix::from_grid(&grid), config),
        Err(EvalError::InvalidConfig { .. })
    ));
}

#[test]
fn corridor_values_rise_towards_goal() {
    let grid = corridor();
    let mdp = Mdp::from_grid(&grid);
    let exact = solve_policy(&mdp, &PolicyMatrix::from_grid(&grid), EvalConfig::default()).unwrap();

    assert_eq!(exact[0], f64::INFINITY);
    assert_eq!(exact[5], f64::INFINITY);
    for c in 1..4 {
        assert!(exact[c] < exact[c + 1], "V{c} = {} >= V{} = {}", exact[c], c + 1, exact[c + 1]);
    }
    assert!(exact[4] < 10.0);
    // V4 = γ·6.7 / (1 - 0.3γ) with γ = 0.99.
    assert!((exact[4] - 0.99 * 6.7 / (1.0 - 0.297)).abs() < 1e-9);
}

#[test]
fn undiscounted_hex_world_is_singular() {
    // Under all-east, (1, 9) bounces off the east edge forever.
    let grid = hex_world();
    let mdp = Mdp::from_grid(&grid);
    let config = EvalConfig::default().with_gamma(1.0);
    match solve_policy(&mdp, &PolicyMatrix::from_grid(&grid), config) {
        Err(EvalError::Singular { states }) => assert!(states.contains(&grid.id(1, 9).index())),
        other => panic!("expected a singular system, got {other:?}"),
    }
}

#[test]
fn trapped_cell_pays_penalty_forever_when_discounted() {
    let grid = hex_world();
    let mdp = Mdp::from_grid(&grid);
    let exact = solve_policy(&mdp, &PolicyMatrix::from_grid(&grid), EvalConfig::default()).unwrap();
    let trapped = exact[grid.id(1, 9).index()];
    assert!((trapped - -99.0).abs() < 1e-6);
}

#[test]
fn monte_carlo_converges_on_corridor() {
    let grid = corridor();
    let mdp = Mdp::from_grid(&grid);
    let policy = PolicyMatrix::from_grid(&grid);
    let exact = solve_policy(&mdp, &policy, EvalConfig::default()).unwrap();
    let estimate = first_visit_monte_carlo(&mdp, &policy, &MonteCarloConfig::default()).unwrap();

    assert_eq!(estimate.discarded, 0);
    assert_eq!(estimate.completed, 10_000);
    assert_close(&estimate.values, &exact, 0.5);
}

#[test]
fn monte_carlo_converges_on_hex_world_under_soft_policy() {
    let grid = hex_world();
    let mdp = Mdp::from_grid(&grid);
    let policy = PolicyMatrix::from_grid(&grid).epsilon_soft(0.3).unwrap();
    let exact = solve_policy(&mdp, &policy, EvalConfig::default()).unwrap();
    let config = MonteCarloConfig::default().with_iterations(2_000).with_batch_size(100);
    let estimate = first_visit_monte_carlo(&mdp, &policy, &config).unwrap();

    let mut checked = 0;
    for s in mdp.decision_states() {
        if estimate.visits[s] < 2_000 {
            continue;
        }
        checked += 1;
        let (mc, v) = (estimate.values[s], exact[s]);
        assert!((mc - v).abs() < 0.5, "state {s}: {mc} vs {v}");
    }
    assert!(checked >= 15, "only {checked} well-visited states");
}

#[test]
fn soft_policy_discards_fewer_trajectories() {
    let grid = hex_world();
    let mdp = Mdp::from_grid(&grid);
    let hard = PolicyMatrix::from_grid(&grid);
    let soft = hard.epsilon_soft(0.3).unwrap();
    let config = MonteCarloConfig::default().with_iterations(200);

    let hard_run = first_visit_monte_carlo(&mdp, &hard, &config).unwrap();
    let soft_run = first_visit_monte_carlo(&mdp, &soft, &config).unwrap();

    assert!(hard_run.discarded > 0);
    assert!(soft_run.discarded < hard_run.discarded);
    assert!(hard_run.values[grid.id(1, 9).index()].is_nan());
}

#[test]
fn value_table_renders_grid() {
    let grid = corridor();
    let values = loopy_lookahead(&grid, EvalConfig::default()).unwrap();
    let table = ValueTable::for_grid(&grid, values).unwrap();
    let text = table.to_string();
    assert_eq!(text.lines().count(), 1);
    assert!(text.trim_start().starts_with("inf"));
    assert!(text.trim_end().ends_with("inf"));
}

#[test]
fn configs_round_trip_through_json() {
    let eval = EvalConfig::default().with_gamma(0.9).with_horizon(40);
    let json = serde_json::to_string(&eval).unwrap();
    assert_eq!(serde_json::from_str::<EvalConfig>(&json).unwrap(), eval);

    let mc: MonteCarloConfig = serde_json::from_str(r#"{"iterations": 5, "max_steps": 50}"#).unwrap();
    assert_eq!(mc.iterations, 5);
    assert_eq!(mc.max_steps, 50);
    assert_eq!(mc.batch_size, 10);
}

fn labels_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    let label = prop_oneof![
        6 => Just("0".to_string()),
        2 => Just("X".to_string()),
        1 => Just("10".to_string()),
        1 => Just("-5".to_string()),
    ]
    .boxed();
    (1usize..5, 1usize..5).prop_flat_map(move |(rows, cols)| {
        prop::collection::vec(prop::collection::vec(label.clone(), cols), rows)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn graph_and_matrix_recursions_agree(
        labels in labels_strategy(),
        m in (0usize..6).prop_map(|i| HexMove::ALL[i]),
        horizon in 0usize..12,
    ) {
        let grid = HexGrid::uniform(&labels, m).unwrap();
        let mdp = Mdp::from_grid(&grid);
        let config = EvalConfig::default().with_gamma(0.95).with_horizon(horizon);
        let graph = loopy_lookahead(&grid, config).unwrap();
        let matrix = recursive_policy_evaluation(&mdp, &PolicyMatrix::from_grid(&grid), config).unwrap();
        for (x, y) in graph.iter().zip(&matrix) {
            if x.is_infinite() {
                prop_assert_eq!(x, y);
            } else {
                prop_assert!((x - y).abs() < 1e-9);
            }
        }
    }
}
