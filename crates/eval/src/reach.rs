//! Reachability on the policy's transition graph.
//!
//! A decision state from which the absorbing state is unreachable sits in
//! a closed region that only bounces between decision cells. Its value
//! under an undiscounted policy is not defined, and the Bellman system for
//! `gamma == 1` is singular there.

use std::collections::VecDeque;

use hexworld_mdp::{Mdp, PolicyKernel, StateKind};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

/// Directed graph with an edge `s -> next` wherever `T_π[s, next] > 0`.
///
/// Node `i` is state `i`; node weights are the state roles and edge
/// weights the transition probabilities.
pub fn transition_graph(mdp: &Mdp, chain: &PolicyKernel) -> DiGraph<StateKind, f64> {
    let mut graph = DiGraph::with_capacity(mdp.num_states(), mdp.num_states() * 3);
    for s in 0..mdp.num_states() {
        graph.add_node(mdp.kind(s));
    }
    for s in 0..mdp.num_states() {
        for (next, p) in chain.successors(s) {
            graph.add_edge(NodeIndex::new(s), NodeIndex::new(next), p);
        }
    }
    graph
}

/// Decision states that never reach the absorbing state under `chain`.
///
/// Walks incoming edges backwards from the absorbing state; whatever the
/// walk misses is trapped.
pub fn trapped_states(mdp: &Mdp, chain: &PolicyKernel) -> Vec<usize> {
    let graph = transition_graph(mdp, chain);
    let mut reached = vec![false; graph.node_count()];
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();

    let absorbing = NodeIndex::new(mdp.absorbing_state());
    reached[absorbing.index()] = true;
    queue.push_back(absorbing);

    while let Some(node) = queue.pop_front() {
        for pred in graph.neighbors_directed(node, Direction::Incoming) {
            if !reached[pred.index()] {
                reached[pred.index()] = true;
                queue.push_back(pred);
            }
        }
    }

    mdp.decision_states().filter(|&s| !reached[s]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexworld_grid::{HexGrid, HexMove};
    use hexworld_mdp::PolicyMatrix;

    fn trapped_for(labels: &[Vec<&str>], action: HexMove) -> Vec<usize> {
        let grid = HexGrid::uniform(labels, action).unwrap();
        let mdp = Mdp::from_grid(&grid);
        let chain = mdp.induced_kernel(&PolicyMatrix::from_grid(&grid)).unwrap();
        trapped_states(&mdp, &chain)
    }

    #[test]
    fn test_corridor_towards_goal_is_free() {
        assert!(trapped_for(&[vec!["0", "0", "0", "10"]], HexMove::East).is_empty());
    }

    #[test]
    fn test_wall_traps_everything_behind_it() {
        // All-west: cell 3 bounces off the block, cells 0 and 1 pile up
        // against the west edge.
        let trapped = trapped_for(&[vec!["0", "0", "X", "0", "10"]], HexMove::West);
        assert_eq!(trapped, vec![0, 1, 3]);
    }

    #[test]
    fn test_graph_shape() {
        let grid = HexGrid::uniform(&[vec!["0", "10"]], HexMove::East).unwrap();
        let mdp = Mdp::from_grid(&grid);
        let chain = mdp.induced_kernel(&PolicyMatrix::from_grid(&grid)).unwrap();
        let graph = transition_graph(&mdp, &chain);
        assert_eq!(graph.node_count(), 3);
        // 0 -> 0 (bounce), 0 -> 1, 1 -> 2, 2 -> 2.
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph[NodeIndex::new(1)], StateKind::Terminal);
    }
}
