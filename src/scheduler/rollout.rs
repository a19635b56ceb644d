//! DP-greedy lookahead fallback.
//!
//! At each step the top candidates by pressure are simulated a few greedy
//! steps ahead on cloned states, and the step whose rollout lands best
//! (feasible first, then lowest peak, then lowest time) is committed.

use std::time::Instant;

use crate::config::SchedulerConfig;
use crate::models::Problem;
use crate::sorting::rank_by_pressure;

use super::accounting::{collect_garbage, execute};
use super::frontier::ready_nodes;
use super::state::ScheduleState;

pub fn lookahead_schedule(problem: &Problem, config: &SchedulerConfig) -> ScheduleState {
    let mut state = ScheduleState::new(problem.node_count());
    let budget = problem.total_memory();
    let branch_factor = config.branch_factor.max(1);
    let deadline = Instant::now() + config.time_limit;

    while !state.is_complete(problem) {
        if Instant::now() > deadline {
            break;
        }
        collect_garbage(problem, &mut state);
        let ready = ready_nodes(problem, &state);
        if ready.is_empty() {
            break;
        }

        let ranked = rank_by_pressure(problem, &state, &ready);
        let top = &ranked[..branch_factor.min(ranked.len())];

        let mut choice = top[0];
        let mut best_key: Option<(bool, i64, i64)> = None;
        for &candidate in top {
            let mut sim = state.clone();
            execute(problem, &mut sim, candidate);
            rollout(problem, &mut sim, config.lookahead_depth);
            let key = (sim.memory_peak > budget, sim.memory_peak, sim.total_time);
            if best_key.map_or(true, |best| key < best) {
                best_key = Some(key);
                choice = candidate;
            }
        }

        execute(problem, &mut state, choice);
    }
    state
}

/// Extend `sim` by up to `depth` greedy steps.
fn rollout(problem: &Problem, sim: &mut ScheduleState, depth: usize) {
    for _ in 0..depth {
        collect_garbage(problem, sim);
        let ready = ready_nodes(problem, sim);
        if ready.is_empty() {
            break;
        }
        let next = rank_by_pressure(problem, sim, &ready)[0];
        execute(problem, sim, next);
    }
}
