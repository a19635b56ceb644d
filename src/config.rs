//! Configuration types for the scheduling system.

use std::time::Duration;

use crate::logging::{VERBOSITY_SILENT, VERBOSITY_SUMMARY, VERBOSITY_TRACE};

/// Search strategy selection for [`crate::scheduler::solve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Bounded DFS, then the fallback ladder: heuristic, lookahead, beam, greedy.
    Hybrid,
    /// Bounded DFS only.
    Dfs,
    /// Negative-first greedy sweep only.
    Heuristic,
    /// DP-greedy bounded lookahead only.
    Lookahead,
    /// Beam search only.
    Beam,
    /// Budget-respecting greedy only.
    Greedy,
}

/// Tunables for the search driver and fallback strategies.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Upper bound on DFS node expansions.
    pub max_expansions: u64,
    /// Wall-clock deadline for the bounded search phases.
    pub time_limit: Duration,
    /// Beam size for the beam-search fallback.
    pub beam_width: usize,
    /// Greedy rollout depth for the DP-greedy fallback.
    pub lookahead_depth: usize,
    /// Candidates simulated per step by the DP-greedy fallback.
    pub branch_factor: usize,
    /// Emit summary counters on stderr.
    pub verbose: bool,
    /// Emit a per-expansion trace record on stderr.
    pub trace: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 200_000,
            time_limit: Duration::from_secs_f64(5.0),
            beam_width: 64,
            lookahead_depth: 3,
            branch_factor: 8,
            verbose: false,
            trace: false,
        }
    }
}

impl SchedulerConfig {
    /// Size-adaptive defaults: huge graphs get a narrow beam and a short
    /// deadline so the ladder degrades toward pure greedy. This is a policy
    /// default, not a contract; explicit settings always win.
    pub fn adaptive(node_count: usize) -> Self {
        let defaults = Self::default();
        if node_count > 200_000 {
            Self {
                beam_width: 1,
                time_limit: Duration::from_secs_f64(0.1),
                ..defaults
            }
        } else if node_count > 10_000 {
            Self {
                beam_width: 16,
                time_limit: Duration::from_secs_f64(1.0),
                ..defaults
            }
        } else {
            defaults
        }
    }

    /// Numeric verbosity for the logging macros.
    pub fn verbosity(&self) -> u8 {
        if self.trace {
            VERBOSITY_TRACE
        } else if self.verbose {
            VERBOSITY_SUMMARY
        } else {
            VERBOSITY_SILENT
        }
    }
}

/// Strategy plus tunables: the single scheduler entry point takes one of these.
#[derive(Clone, Debug)]
pub struct SchedulePolicy {
    pub algorithm: Algorithm,
    pub config: SchedulerConfig,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Hybrid,
            config: SchedulerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_expansions, 200_000);
        assert_eq!(config.time_limit, Duration::from_secs_f64(5.0));
        assert_eq!(config.beam_width, 64);
        assert_eq!(config.lookahead_depth, 3);
        assert_eq!(config.branch_factor, 8);
        assert!(!config.verbose);
        assert!(!config.trace);
    }

    #[test]
    fn test_adaptive_tiers() {
        assert_eq!(SchedulerConfig::adaptive(100).beam_width, 64);
        assert_eq!(SchedulerConfig::adaptive(50_000).beam_width, 16);
        let huge = SchedulerConfig::adaptive(300_000);
        assert_eq!(huge.beam_width, 1);
        assert_eq!(huge.time_limit, Duration::from_secs_f64(0.1));
    }

    #[test]
    fn test_verbosity_mapping() {
        let mut config = SchedulerConfig::default();
        assert_eq!(config.verbosity(), VERBOSITY_SILENT);
        config.verbose = true;
        assert_eq!(config.verbosity(), VERBOSITY_SUMMARY);
        config.trace = true;
        assert_eq!(config.verbosity(), VERBOSITY_TRACE);
    }
}
