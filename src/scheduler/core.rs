//! The search driver: bounded DFS with spill/recompute, instrumentation,
//! best-schedule tracking, and the hybrid fallback ladder.

use std::time::Instant;

use crate::config::{Algorithm, SchedulePolicy, SchedulerConfig};
use crate::models::Problem;
use crate::{log_summary, log_trace};

use super::accounting::{collect_garbage, execute, restore_outputs, sequential_peak, undo};
use super::beam::beam_search_schedule;
use super::frontier::{prune_negative_impact, ready_nodes, recompute_candidates};
use super::heuristics::{greedy_schedule, heuristic_schedule};
use super::rollout::lookahead_schedule;
use super::spill::{choose_spill, evict};
use super::state::ScheduleState;

/// Search instrumentation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugStats {
    /// Node executions performed by the DFS.
    pub expansions: u64,
    /// Candidates skipped because their predicted peak broke the budget.
    pub memory_prunes: u64,
    /// States with no way forward (empty frontier or failed spill).
    pub dead_ends: u64,
}

/// Terminal result of [`solve`].
#[derive(Clone, Debug)]
pub struct ScheduleResult {
    pub state: ScheduleState,
    pub stats: DebugStats,
    /// Every node appears in the execution order at least once.
    pub complete: bool,
    /// The observed peak stayed within the memory budget.
    pub feasible: bool,
}

/// Acceptance predicate: feasibility beats infeasibility, then smaller total
/// time, then smaller peak.
pub fn is_better_schedule(a: &ScheduleState, b: &ScheduleState, total_memory: i64) -> bool {
    let a_feasible = a.memory_peak <= total_memory;
    let b_feasible = b.memory_peak <= total_memory;
    if a_feasible != b_feasible {
        return a_feasible;
    }
    if a.total_time != b.total_time {
        return a.total_time < b.total_time;
    }
    a.memory_peak < b.memory_peak
}

/// Schedule `problem` under `policy` and report the outcome. Never fails:
/// infeasibility and incompleteness are flags on the result.
pub fn solve(problem: &Problem, policy: &SchedulePolicy) -> ScheduleResult {
    let config = &policy.config;
    let verbosity = config.verbosity();
    let mut searcher = Searcher::new(problem, config);

    let state = match policy.algorithm {
        Algorithm::Hybrid => hybrid_schedule(problem, config, &mut searcher),
        Algorithm::Dfs => searcher.dfs_schedule(),
        Algorithm::Heuristic => heuristic_schedule(problem),
        Algorithm::Lookahead => lookahead_schedule(problem, config),
        Algorithm::Beam => beam_search_schedule(problem, config),
        Algorithm::Greedy => greedy_schedule(problem),
    };

    let stats = searcher.stats;
    log_summary!(
        verbosity,
        "search: expansions={} memory_prunes={} dead_ends={}",
        stats.expansions,
        stats.memory_prunes,
        stats.dead_ends
    );

    let complete = state.is_complete(problem);
    let feasible = state.memory_peak <= problem.total_memory();
    ScheduleResult {
        state,
        stats,
        complete,
        feasible,
    }
}

/// Bounded DFS first, then the fallback ladder in order. The first complete
/// feasible schedule wins; otherwise the best complete one under the
/// acceptance predicate; otherwise the partial covering the most nodes.
fn hybrid_schedule(
    problem: &Problem,
    config: &SchedulerConfig,
    searcher: &mut Searcher<'_>,
) -> ScheduleState {
    let verbosity = config.verbosity();
    let mut best = searcher.dfs_schedule();
    if complete_and_feasible(problem, &best) {
        return best;
    }
    log_summary!(
        verbosity,
        "search: DFS found no feasible complete schedule; running fallbacks"
    );

    for (name, fallback) in FALLBACKS {
        let candidate = fallback(problem, config);
        log_summary!(
            verbosity,
            "fallback {}: complete={} peak={} time={}",
            name,
            candidate.is_complete(problem),
            candidate.memory_peak,
            candidate.total_time
        );
        if complete_and_feasible(problem, &candidate) {
            return candidate;
        }
        best = pick_better(problem, best, candidate);
    }
    best
}

type Fallback = fn(&Problem, &SchedulerConfig) -> ScheduleState;

const FALLBACKS: [(&str, Fallback); 4] = [
    ("heuristic", |problem, _| heuristic_schedule(problem)),
    ("lookahead", lookahead_schedule),
    ("beam", beam_search_schedule),
    ("greedy", |problem, _| greedy_schedule(problem)),
];

fn complete_and_feasible(problem: &Problem, state: &ScheduleState) -> bool {
    state.is_complete(problem) && state.memory_peak <= problem.total_memory()
}

/// Completeness first, then coverage, then the acceptance predicate.
fn pick_better(problem: &Problem, a: ScheduleState, b: ScheduleState) -> ScheduleState {
    let a_complete = a.is_complete(problem);
    let b_complete = b.is_complete(problem);
    if a_complete != b_complete {
        return if a_complete { a } else { b };
    }
    if !a_complete && a.computed_count() != b.computed_count() {
        return if a.computed_count() > b.computed_count() {
            a
        } else {
            b
        };
    }
    if is_better_schedule(&b, &a, problem.total_memory()) {
        b
    } else {
        a
    }
}

/// Depth-first searcher owning the limits, the best-so-far schedule, and the
/// instrumentation counters. One state is threaded through the recursion and
/// every transition is undone on the way back up.
struct Searcher<'p> {
    problem: &'p Problem,
    verbosity: u8,
    deadline: Instant,
    expansions_left: u64,
    best: Option<ScheduleState>,
    stats: DebugStats,
}

impl<'p> Searcher<'p> {
    fn new(problem: &'p Problem, config: &SchedulerConfig) -> Self {
        Self {
            problem,
            verbosity: config.verbosity(),
            deadline: Instant::now() + config.time_limit,
            expansions_left: config.max_expansions,
            best: None,
            stats: DebugStats::default(),
        }
    }

    /// Run the bounded DFS from the empty state and return the best complete
    /// schedule seen, or the empty state when none was reached.
    fn dfs_schedule(&mut self) -> ScheduleState {
        let mut state = ScheduleState::new(self.problem.node_count());
        self.dfs(&mut state);
        self.best
            .take()
            .unwrap_or_else(|| ScheduleState::new(self.problem.node_count()))
    }

    fn exhausted(&self) -> bool {
        self.expansions_left == 0 || Instant::now() > self.deadline
    }

    fn offer_best(&mut self, state: &ScheduleState) {
        let replace = match &self.best {
            None => true,
            Some(best) => is_better_schedule(state, best, self.problem.total_memory()),
        };
        if replace {
            self.best = Some(state.clone());
        }
    }

    fn dfs(&mut self, state: &mut ScheduleState) {
        if self.exhausted() {
            return;
        }
        if state.is_complete(self.problem) {
            self.offer_best(state);
            return;
        }

        let gc_removed = collect_garbage(self.problem, state);

        let mut candidates = ready_nodes(self.problem, state);
        if candidates.is_empty() {
            candidates = recompute_candidates(self.problem, state);
        }
        if candidates.is_empty() {
            self.stats.dead_ends += 1;
            restore_outputs(self.problem, state, &gc_removed);
            return;
        }
        let candidates = prune_negative_impact(self.problem, state, candidates);

        let budget = self.problem.total_memory();
        let any_fits = candidates
            .iter()
            .any(|&id| sequential_peak(state, self.problem.node(id)) <= budget);

        if !any_fits {
            // Everything on the frontier breaks the budget: evict one output
            // and retry this state once. The retried frame gets its own spill
            // chance, so chains of evictions unwind naturally.
            match choose_spill(self.problem, state) {
                Some(victim) => {
                    log_trace!(
                        self.verbosity,
                        "spill {} freeing {} (mem {} -> {})",
                        self.problem.name_of(victim),
                        self.problem.node(victim).output_mem(),
                        state.current_memory,
                        state.current_memory - self.problem.node(victim).output_mem()
                    );
                    evict(self.problem, state, victim);
                    self.dfs(state);
                    restore_outputs(self.problem, state, &[victim]);
                }
                None => self.stats.dead_ends += 1,
            }
            restore_outputs(self.problem, state, &gc_removed);
            return;
        }

        for &id in &candidates {
            if self.exhausted() {
                break;
            }
            if sequential_peak(state, self.problem.node(id)) > budget {
                self.stats.memory_prunes += 1;
                continue;
            }
            let delta = execute(self.problem, state, id);
            self.stats.expansions += 1;
            self.expansions_left -= 1;
            log_trace!(
                self.verbosity,
                "expand {} time={} mem={} peak={} frontier={}",
                self.problem.name_of(id),
                state.total_time,
                state.current_memory,
                state.memory_peak,
                candidates.len()
            );
            self.dfs(state);
            undo(self.problem, state, delta);
        }

        restore_outputs(self.problem, state, &gc_removed);
    }
}
