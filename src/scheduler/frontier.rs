//! Frontier enumeration and the negative-impact pruning rule.

use crate::names::NodeId;
use crate::models::Problem;

use super::accounting::{dynamic_impact, sequential_peak};
use super::state::ScheduleState;

/// Nodes that can run next: never executed, and every input currently
/// resident. Residency (not mere prior execution) is required because an
/// evicted input must be recomputed before its consumers can run.
/// Enumerates in input-spec order.
pub fn ready_nodes(problem: &Problem, state: &ScheduleState) -> Vec<NodeId> {
    let mut ready = Vec::new();
    for id in 0..problem.node_count() as NodeId {
        if state.is_computed(id) {
            continue;
        }
        let inputs_resident = problem
            .node(id)
            .inputs()
            .iter()
            .all(|&input| state.is_resident(input));
        if inputs_resident {
            ready.push(id);
        }
    }
    ready
}

/// Evicted outputs worth re-running: not resident, still needed by an
/// uncomputed consumer, and recomputable right now (inputs resident).
pub fn recompute_candidates(problem: &Problem, state: &ScheduleState) -> Vec<NodeId> {
    let mut candidates = Vec::new();
    for id in 0..problem.node_count() as NodeId {
        if !state.is_computed(id) || state.is_resident(id) {
            continue;
        }
        let needed = problem
            .consumers(id)
            .iter()
            .any(|&consumer| !state.is_computed(consumer));
        if !needed {
            continue;
        }
        let inputs_resident = problem
            .node(id)
            .inputs()
            .iter()
            .all(|&input| state.is_resident(input));
        if inputs_resident {
            candidates.push(id);
        }
    }
    candidates
}

/// Negative-impact pruning.
///
/// Find the candidate with `dynamic_impact <= 0` and minimum `peak` (first
/// in input-spec order wins ties). A free-or-shrinking step that does not
/// raise the observed ceiling dominates every alternative, so the frontier
/// collapses to it alone; if it would raise the ceiling, candidates with a
/// strictly smaller peak stay in play. No negative candidate: unchanged.
pub fn prune_negative_impact(
    problem: &Problem,
    state: &ScheduleState,
    candidates: Vec<NodeId>,
) -> Vec<NodeId> {
    let mut best: Option<NodeId> = None;
    let mut best_peak = i64::MAX;
    for &id in &candidates {
        let impact = dynamic_impact(problem, state, id);
        if impact <= 0 && problem.node(id).peak() < best_peak {
            best = Some(id);
            best_peak = problem.node(id).peak();
        }
    }
    let Some(best) = best else {
        return candidates;
    };

    if sequential_peak(state, problem.node(best)) <= state.memory_peak {
        return vec![best];
    }
    candidates
        .into_iter()
        .filter(|&id| id == best || problem.node(id).peak() < best_peak)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeSpec;
    use crate::scheduler::accounting::execute;

    fn spec(name: &str, inputs: &[&str], run: i64, out: i64, time: i64) -> NodeSpec {
        NodeSpec {
            name: name.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            run_mem: run,
            output_mem: out,
            time_cost: time,
        }
    }

    #[test]
    fn test_ready_requires_resident_inputs() {
        let problem = Problem::new(
            100,
            vec![
                spec("a", &[], 1, 20, 1),
                spec("b", &["a"], 1, 5, 1),
                spec("c", &["b"], 1, 5, 1),
            ],
        )
        .unwrap();
        let mut state = ScheduleState::new(problem.node_count());
        let a = problem.id_of("a").unwrap();
        let b = problem.id_of("b").unwrap();

        assert_eq!(ready_nodes(&problem, &state), vec![a]);

        execute(&problem, &mut state, a);
        assert_eq!(ready_nodes(&problem, &state), vec![b]);

        // Evicting a's output takes b back out of the ready set even though
        // a stays computed.
        state.resident[a as usize] = false;
        state.current_memory -= 20;
        assert!(ready_nodes(&problem, &state).is_empty());
        assert_eq!(recompute_candidates(&problem, &state), vec![a]);
    }

    #[test]
    fn test_recompute_candidate_needs_uncomputed_consumer() {
        let problem = Problem::new(
            100,
            vec![spec("a", &[], 1, 20, 1), spec("b", &["a"], 1, 5, 1)],
        )
        .unwrap();
        let mut state = ScheduleState::new(problem.node_count());
        let a = problem.id_of("a").unwrap();
        let b = problem.id_of("b").unwrap();

        execute(&problem, &mut state, a);
        execute(&problem, &mut state, b);
        state.resident[a as usize] = false;
        state.current_memory -= 20;

        // a's only consumer already ran; recomputing it would be pointless.
        assert!(recompute_candidates(&problem, &state).is_empty());
    }

    #[test]
    fn test_prune_collapses_to_singleton_when_ceiling_safe() {
        // After a runs, c frees a's 40 without raising the observed peak.
        let problem = Problem::new(
            50,
            vec![
                spec("a", &[], 1, 40, 1),
                spec("b", &[], 1, 5, 1),
                spec("c", &["a"], 1, 5, 1),
            ],
        )
        .unwrap();
        let mut state = ScheduleState::new(problem.node_count());
        let a = problem.id_of("a").unwrap();
        let c = problem.id_of("c").unwrap();

        execute(&problem, &mut state, a);
        state.memory_peak = 45; // pretend the ceiling is already high enough

        let ready = ready_nodes(&problem, &state);
        assert_eq!(prune_negative_impact(&problem, &state, ready), vec![c]);
    }

    #[test]
    fn test_prune_keeps_smaller_peaks_when_ceiling_would_rise() {
        let problem = Problem::new(
            50,
            vec![
                spec("a", &[], 1, 40, 1),
                spec("b", &[], 1, 2, 1), // peak 2, below the negative candidate's 5
                spec("c", &["a"], 1, 5, 1),
            ],
        )
        .unwrap();
        let mut state = ScheduleState::new(problem.node_count());
        let a = problem.id_of("a").unwrap();
        let b = problem.id_of("b").unwrap();
        let c = problem.id_of("c").unwrap();

        execute(&problem, &mut state, a);
        // Peak is 40; c would push it to 45, so b (peak 2) survives the prune.
        let ready = ready_nodes(&problem, &state);
        assert_eq!(prune_negative_impact(&problem, &state, ready), vec![b, c]);
    }

    #[test]
    fn test_prune_no_negative_candidate_is_identity() {
        let problem = Problem::new(
            50,
            vec![spec("a", &[], 1, 10, 1), spec("b", &[], 1, 10, 1)],
        )
        .unwrap();
        let state = ScheduleState::new(problem.node_count());
        let ready = ready_nodes(&problem, &state);
        assert_eq!(
            prune_negative_impact(&problem, &state, ready.clone()),
            ready
        );
    }
}
