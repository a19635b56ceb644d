//! Beam search fallback over partial schedules.

use std::time::Instant;

use crate::config::SchedulerConfig;
use crate::models::Problem;
use crate::sorting::rank_by_pressure;

use super::accounting::{collect_garbage, execute};
use super::core::is_better_schedule;
use super::frontier::ready_nodes;
use super::state::ScheduleState;

/// Keep the `beam_width` best partial schedules per round, each expanded by
/// its `beam_width` best ready candidates. Partial schedules are ordered
/// feasible-first, then by time, then by peak: the acceptance predicate
/// applied to partials.
pub fn beam_search_schedule(problem: &Problem, config: &SchedulerConfig) -> ScheduleState {
    let beam_width = config.beam_width.max(1);
    let budget = problem.total_memory();
    let deadline = Instant::now() + config.time_limit;
    let mut expansions_left = config.max_expansions;

    let mut beam = vec![ScheduleState::new(problem.node_count())];
    let mut best: Option<ScheduleState> = None;

    while !beam.is_empty() {
        if Instant::now() > deadline || expansions_left == 0 {
            break;
        }

        let mut next = Vec::new();
        for mut state in beam.drain(..) {
            collect_garbage(problem, &mut state);
            if state.is_complete(problem) {
                offer(&mut best, state, budget);
                continue;
            }
            let ready = ready_nodes(problem, &state);
            let ranked = rank_by_pressure(problem, &state, &ready);
            for &id in ranked.iter().take(beam_width) {
                if expansions_left == 0 {
                    break;
                }
                let mut child = state.clone();
                execute(problem, &mut child, id);
                expansions_left -= 1;
                next.push(child);
            }
        }

        next.sort_by(|a, b| {
            let a_over = a.memory_peak > budget;
            let b_over = b.memory_peak > budget;
            a_over
                .cmp(&b_over)
                .then(a.total_time.cmp(&b.total_time))
                .then(a.memory_peak.cmp(&b.memory_peak))
        });
        next.truncate(beam_width);
        beam = next;
    }

    // A limit may fire with unexamined complete schedules still in the beam.
    for state in beam {
        if state.is_complete(problem) {
            offer(&mut best, state, budget);
        }
    }

    best.unwrap_or_else(|| ScheduleState::new(problem.node_count()))
}

fn offer(best: &mut Option<ScheduleState>, candidate: ScheduleState, budget: i64) {
    let replace = match best {
        None => true,
        Some(current) => is_better_schedule(&candidate, current, budget),
    };
    if replace {
        *best = Some(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeSpec;

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
    fn test_beam_completes_diamond() {
        let problem = Problem::new(
            100,
            vec![
                spec("a", &[], 10, 40, 1),
                spec("b", &["a"], 10, 20, 1),
                spec("c", &["a"], 10, 20, 1),
                spec("d", &["b", "c"], 10, 10, 1),
            ],
        )
        .unwrap();
        let state = beam_search_schedule(&problem, &SchedulerConfig::default());
        assert!(state.is_complete(&problem));
        assert!(state.memory_peak <= 100);
        assert_eq!(state.total_time, 4);
    }

    #[test]
    fn test_beam_width_one_degenerates_to_greedy_line() {
        let problem = Problem::new(
            100,
            vec![spec("big", &[], 1, 50, 1), spec("small", &[], 1, 5, 1)],
        )
        .unwrap();
        let config = SchedulerConfig {
            beam_width: 1,
            ..SchedulerConfig::default()
        };
        let state = beam_search_schedule(&problem, &config);
        assert!(state.is_complete(&problem));
        assert_eq!(problem.name_of(state.execution_order[0]), "small");
    }

    #[test]
    fn test_beam_prefers_feasible_partials() {
        // A wide-enough beam keeps the order that frees the producer early
        // even though the first step looks worse.
        let problem = Problem::new(
            70,
            vec![
                spec("producer", &[], 1, 60, 1),
                spec("consumer", &["producer"], 1, 5, 1),
                spec("filler", &[], 1, 30, 1),
                spec("sink", &["consumer", "filler"], 1, 1, 1),
            ],
        )
        .unwrap();
        let state = beam_search_schedule(&problem, &SchedulerConfig::default());
        assert!(state.is_complete(&problem));
        assert!(state.memory_peak <= 70);
    }

    #[test]
    fn test_beam_is_deterministic() {
        let specs = vec![
            spec("a", &[], 3, 12, 2),
            spec("b", &["a"], 4, 7, 1),
            spec("c", &["a"], 4, 7, 3),
            spec("d", &["b"], 2, 9, 1),
            spec("e", &["c", "d"], 5, 1, 2),
        ];
        let problem = Problem::new(60, specs).unwrap();
        let config = SchedulerConfig::default();
        let first = beam_search_schedule(&problem, &config);
        let second = beam_search_schedule(&problem, &config);
        assert_eq!(first, second);
    }
}
