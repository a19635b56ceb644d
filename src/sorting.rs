//! Deterministic candidate ranking for the fallback strategies.
//!
//! Greedy, lookahead, and beam search all order candidates the same way:
//! lowest predicted peak first, then cheapest, then by name so reruns on the
//! same input produce byte-identical schedules.

use std::cmp::Ordering;

use crate::names::NodeId;
use crate::models::Problem;
use crate::scheduler::accounting::sequential_peak;
use crate::scheduler::ScheduleState;

/// Rank `candidates` by `(sequential_peak, time_cost, name)`, ascending.
pub fn rank_by_pressure(
    problem: &Problem,
    state: &ScheduleState,
    candidates: &[NodeId],
) -> Vec<NodeId> {
    let mut keys: Vec<(i64, i64, NodeId)> = candidates
        .iter()
        .map(|&id| {
            let node = problem.node(id);
            (sequential_peak(state, node), node.time_cost(), id)
        })
        .collect();
    keys.sort_by(|a, b| rank_cmp(problem, a, b));
    keys.into_iter().map(|(_, _, id)| id).collect()
}

fn rank_cmp(problem: &Problem, a: &(i64, i64, NodeId), b: &(i64, i64, NodeId)) -> Ordering {
    a.0.cmp(&b.0)
        .then(a.1.cmp(&b.1))
        .then_with(|| problem.name_of(a.2).cmp(problem.name_of(b.2)))
}
