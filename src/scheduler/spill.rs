//! Eviction policy for over-budget frontiers.
//!
//! Scores each resident output by `output_mem / max(1, time_cost)`: big
//! outputs that are cheap to recompute go first. Compared by integer
//! cross-multiplication; equal scores fall back to the larger output, then
//! input-spec order.

use crate::names::NodeId;
use crate::models::Problem;

use super::state::ScheduleState;

/// Pick the resident output to evict, or `None` if nothing is resident.
pub fn choose_spill(problem: &Problem, state: &ScheduleState) -> Option<NodeId> {
    let mut best: Option<NodeId> = None;
    for id in state.resident_ids() {
        match best {
            None => best = Some(id),
            Some(current) => {
                if spill_beats(problem, id, current) {
                    best = Some(id);
                }
            }
        }
    }
    best
}

/// True iff `a` scores strictly higher than `b` (larger size per unit of
/// recompute time, then larger size).
fn spill_beats(problem: &Problem, a: NodeId, b: NodeId) -> bool {
    let (size_a, cost_a) = size_and_cost(problem, a);
    let (size_b, cost_b) = size_and_cost(problem, b);
    // size_a / cost_a > size_b / cost_b, without floats.
    let lhs = size_a * cost_b;
    let rhs = size_b * cost_a;
    if lhs != rhs {
        return lhs > rhs;
    }
    size_a > size_b
}

fn size_and_cost(problem: &Problem, id: NodeId) -> (i64, i64) {
    let node = problem.node(id);
    (node.output_mem(), node.time_cost().max(1))
}

/// Drop `id`'s output from memory. The output stays reachable through
/// recomputation as long as its inputs can be made resident again.
pub fn evict(problem: &Problem, state: &mut ScheduleState, id: NodeId) {
    debug_assert!(state.is_resident(id));
    state.resident[id as usize] = false;
    state.current_memory -= problem.node(id).output_mem();
}
