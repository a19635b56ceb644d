//! The memory-bounded scheduler.
//!
//! A bounded depth-first search over topological orders with spill and
//! recompute, backed by a fallback ladder (heuristic, lookahead, beam,
//! greedy) when the search budget runs out.

pub mod accounting;
mod beam;
mod core;
mod frontier;
mod heuristics;
mod rollout;
mod spill;
mod state;

pub use core::{is_better_schedule, solve, DebugStats, ScheduleResult};
pub use frontier::{ready_nodes, recompute_candidates};
pub use state::ScheduleState;
