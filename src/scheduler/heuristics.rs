//! Single-pass fallback sweeps: the negative-first heuristic and the
//! budget-respecting greedy.
//!
//! Neither strategy evicts anything, so on a valid DAG the ready set only
//! empties once the schedule is complete (greedy can still stall early when
//! every candidate breaks the budget).

use crate::names::NodeId;
use crate::models::Problem;
use crate::sorting::rank_by_pressure;

use super::accounting::{collect_garbage, dynamic_impact, execute, sequential_peak};
use super::frontier::ready_nodes;
use super::state::ScheduleState;

/// Greedy sweep preferring memory-freeing candidates: any ready node with
/// `dynamic_impact <= 0` (smallest peak wins), else the node with the lowest
/// predicted peak. Does not enforce the budget; the caller judges the result.
pub fn heuristic_schedule(problem: &Problem) -> ScheduleState {
    let mut state = ScheduleState::new(problem.node_count());
    while !state.is_complete(problem) {
        collect_garbage(problem, &mut state);
        let ready = ready_nodes(problem, &state);
        if ready.is_empty() {
            break;
        }
        let choice = pick_negative(problem, &state, &ready)
            .unwrap_or_else(|| rank_by_pressure(problem, &state, &ready)[0]);
        execute(problem, &mut state, choice);
    }
    state
}

/// The ready candidate with `dynamic_impact <= 0` and minimum peak, first in
/// input-spec order on ties.
fn pick_negative(problem: &Problem, state: &ScheduleState, ready: &[NodeId]) -> Option<NodeId> {
    let mut best: Option<NodeId> = None;
    let mut best_peak = i64::MAX;
    for &id in ready {
        if dynamic_impact(problem, state, id) <= 0 && problem.node(id).peak() < best_peak {
            best = Some(id);
            best_peak = problem.node(id).peak();
        }
    }
    best
}

/// Plain greedy: lowest predicted peak, then cheapest, candidates that would
/// break the budget excluded. Stalls (returns a partial schedule) when no
/// candidate fits.
pub fn greedy_schedule(problem: &Problem) -> ScheduleState {
    let mut state = ScheduleState::new(problem.node_count());
    let budget = problem.total_memory();
    while !state.is_complete(problem) {
        collect_garbage(problem, &mut state);
        let ready = ready_nodes(problem, &state);
        if ready.is_empty() {
            break;
        }
        let ranked = rank_by_pressure(problem, &state, &ready);
        let choice = ranked
            .into_iter()
            .find(|&id| sequential_peak(&state, problem.node(id)) <= budget);
        match choice {
            Some(id) => {
                execute(problem, &mut state, id);
            }
            None => break,
        }
    }
    state
}
