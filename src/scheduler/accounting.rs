//! The memory accounting kernel.
//!
//! Pure queries (`sequential_peak`, `freeable_inputs`, `dynamic_impact`)
//! plus the state transitions (`execute`/`undo`, garbage collection). All
//! arithmetic is 64-bit signed integer; outputs are materialized before
//! inputs are released, so a node's peak sits on top of the pre-free
//! resident total.

use crate::names::NodeId;
use crate::models::{Node, Problem};

use super::state::{ScheduleState, StepDelta};

/// Peak the schedule would observe if `node` ran next: resident outputs stay
/// while the node briefly needs its own peak on top.
#[inline]
pub fn sequential_peak(state: &ScheduleState, node: &Node) -> i64 {
    state.memory_peak.max(node.peak() + state.current_memory)
}

/// Inputs of `id` whose every consumer other than `id` itself has already
/// executed. Judged against the hypothetical post-state that includes `id`,
/// so an input solely consumed by `id` is freeable. Residency is not
/// checked here; callers skip inputs that are already absent.
pub fn freeable_inputs(problem: &Problem, state: &ScheduleState, id: NodeId) -> Vec<NodeId> {
    let mut freeable = Vec::new();
    for &input in problem.node(id).inputs() {
        if freeable.contains(&input) {
            continue;
        }
        let all_consumers_done = problem
            .consumers(input)
            .iter()
            .all(|&consumer| consumer == id || state.is_computed(consumer));
        if all_consumers_done {
            freeable.push(input);
        }
    }
    freeable
}

/// Net memory change if `id` ran next: its output size minus the resident
/// inputs it would free. May be negative.
pub fn dynamic_impact(problem: &Problem, state: &ScheduleState, id: NodeId) -> i64 {
    let freed: i64 = freeable_inputs(problem, state, id)
        .into_iter()
        .filter(|&input| state.is_resident(input))
        .map(|input| problem.node(input).output_mem())
        .sum();
    problem.node(id).output_mem() - freed
}

/// Run `id`: bump the peak against the pre-free resident total, free the
/// inputs whose last consumer this is, materialize the output, and append
/// the step. Returns the delta that [`undo`] reverses exactly.
pub fn execute(problem: &Problem, state: &mut ScheduleState, id: NodeId) -> StepDelta {
    let node = problem.node(id);
    debug_assert!(!state.is_resident(id), "executing a node whose output is resident");

    let prev_peak = state.memory_peak;
    state.memory_peak = sequential_peak(state, node);

    let mut freed = Vec::new();
    for input in freeable_inputs(problem, state, id) {
        if state.resident[input as usize] {
            state.resident[input as usize] = false;
            state.current_memory -= problem.node(input).output_mem();
            freed.push(input);
        }
    }
    // The resident set and current_memory move in lockstep, so the subtraction
    // cannot drive the total negative.
    debug_assert!(state.current_memory >= 0);

    let first_time = !state.computed[id as usize];
    state.resident[id as usize] = true;
    state.current_memory += node.output_mem();
    state.execution_order.push(id);
    state.recompute_flags.push(!first_time);
    state.total_time += node.time_cost();
    if first_time {
        state.computed[id as usize] = true;
        state.computed_count += 1;
    }

    StepDelta {
        node: id,
        freed,
        prev_peak,
        first_time,
    }
}

/// Reverse one [`execute`] step.
pub fn undo(problem: &Problem, state: &mut ScheduleState, delta: StepDelta) {
    let node = problem.node(delta.node);
    state.execution_order.pop();
    state.recompute_flags.pop();
    state.total_time -= node.time_cost();
    state.current_memory -= node.output_mem();
    state.resident[delta.node as usize] = false;
    if delta.first_time {
        state.computed[delta.node as usize] = false;
        state.computed_count -= 1;
    }
    for input in delta.freed {
        state.resident[input as usize] = true;
        state.current_memory += problem.node(input).output_mem();
    }
    state.memory_peak = delta.prev_peak;
}

/// Drop every resident output with no uncomputed consumer. Returns the
/// evicted ids (in input-spec order) so callers can restore them.
pub fn collect_garbage(problem: &Problem, state: &mut ScheduleState) -> Vec<NodeId> {
    let mut removed = Vec::new();
    for id in 0..problem.node_count() as NodeId {
        if !state.resident[id as usize] {
            continue;
        }
        let dead = problem
            .consumers(id)
            .iter()
            .all(|&consumer| state.is_computed(consumer));
        if dead {
            state.resident[id as usize] = false;
            state.current_memory -= problem.node(id).output_mem();
            removed.push(id);
        }
    }
    removed
}

/// Re-materialize outputs removed by GC or a spill.
pub fn restore_outputs(problem: &Problem, state: &mut ScheduleState, ids: &[NodeId]) {
    for &id in ids {
        debug_assert!(!state.resident[id as usize]);
        state.resident[id as usize] = true;
        state.current_memory += problem.node(id).output_mem();
    }
}
