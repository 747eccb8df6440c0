//! Hex World: evaluating a fixed policy three ways
//!
//! Run with: cargo run -p hexworld-eval --example hexworld_policy_eval
//!
//! This example demonstrates:
//! - Building a hex grid with payoffs and blocked tiles
//! - Turning it into transition and reward matrices
//! - Bounded lookahead, closed-form solve and Monte Carlo on the same policy
//! - What happens when the policy never leaves a region

use hexworld_eval::{
    first_visit_monte_carlo, loopy_lookahead, solve_policy, trapped_states, EvalConfig, EvalError,
    MonteCarloConfig, ValueTable,
};
use hexworld_grid::{HexGrid, HexMove};
use hexworld_mdp::{Mdp, PolicyMatrix};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Hex World: Policy Evaluation ===\n");

    // -------------------------------------------------------------------------
    // 1. The grid
    // -------------------------------------------------------------------------
    println!("1. The grid (X = blocked, nonzero = payoff)");
    println!("-------------------------------------------");

    let labels = vec![
        vec!["0", "0", "0", "0", "0", "0", "0", "0", "0", "0"],
        vec!["5", "0", "0", "X", "0", "0", "X", "X", "0", "0"],
        vec!["0", "0", "-10", "0", "X", "0", "0", "0", "X", "10"],
    ];
    for (r, row) in labels.iter().enumerate() {
        let indent = if r % 2 == 1 { "  " } else { "" };
        println!("{indent}{}", row.iter().map(|l| format!("{l:>3}")).collect::<Vec<_>>().join(" "));
    }
    println!();

    let grid = HexGrid::uniform(&labels, HexMove::East)?;
    let mdp = Mdp::from_grid(&grid);
    let policy = PolicyMatrix::from_grid(&grid);
    println!(
        "{} cells, {} decision states, absorbing state #{}",
        mdp.num_cells(),
        mdp.decision_states().count(),
        mdp.absorbing_state()
    );
    println!();

    // -------------------------------------------------------------------------
    // 2. Bounded lookahead vs closed form
    // -------------------------------------------------------------------------
    println!("2. All-east policy: lookahead (horizon 10) vs closed form");
    println!("---------------------------------------------------------");

    let config = EvalConfig::default();
    let lookahead = ValueTable::for_grid(&grid, loopy_lookahead(&grid, config)?)?;
    let exact = ValueTable::for_grid(&grid, solve_policy(&mdp, &policy, config)?)?;
    println!("Lookahead:\n{lookahead}");
    println!("Closed form:\n{exact}");
    if let Some(diff) = lookahead.max_abs_diff(&exact) {
        println!("Largest gap: {diff:.3} (shrinks as the horizon grows)");
    }
    println!();

    // -------------------------------------------------------------------------
    // 3. Trapped regions
    // -------------------------------------------------------------------------
    println!("3. Trapped regions");
    println!("------------------");

    let chain = mdp.induced_kernel(&policy)?;
    println!("States that never reach a payoff: {:?}", trapped_states(&mdp, &chain));
    match solve_policy(&mdp, &policy, config.with_gamma(1.0)) {
        Err(EvalError::Singular { states }) => {
            println!("Undiscounted solve is singular on {} states", states.len())
        }
        other => println!("Undiscounted solve: {other:?}"),
    }
    println!();

    // -------------------------------------------------------------------------
    // 4. Monte Carlo
    // -------------------------------------------------------------------------
    println!("4. First-visit Monte Carlo");
    println!("--------------------------");

    let mc = MonteCarloConfig::default().with_iterations(300);
    let hard = first_visit_monte_carlo(&mdp, &policy, &mc)?;
    let soft = first_visit_monte_carlo(&mdp, &policy.epsilon_soft(0.2)?, &mc)?;
    println!(
        "Deterministic policy: {} completed, {} discarded ({:.0}%)",
        hard.completed,
        hard.discarded,
        100.0 * hard.discard_rate()
    );
    println!(
        "Epsilon-soft (0.2):   {} completed, {} discarded ({:.0}%)",
        soft.completed,
        soft.discarded,
        100.0 * soft.discard_rate()
    );
    println!("\nDeterministic estimate (NaN = never seen in a finished run):");
    println!("{}", ValueTable::for_grid(&grid, hard.values)?);

    Ok(())
}
