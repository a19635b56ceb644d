//! Thin CLI: read a problem, run the scheduler, print the result.

use std::fs;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use opsched::baseline::baseline_schedule;
use opsched::{parse_auto, solve, Algorithm, Problem, SchedulePolicy, SchedulerConfig};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "opsched",
    version,
    about = "Schedule an operator DAG under a hard memory budget.",
    long_about = None
)]
struct CliArgs {
    /// Input file, in either the numbered (`Return N`) or plain (`memory N`)
    /// format; the format is auto-detected.
    input: String,

    /// Search strategy.
    #[arg(long, value_enum, default_value = "hybrid")]
    algorithm: AlgorithmArg,

    /// Upper bound on DFS node expansions.
    #[arg(long, value_name = "N")]
    max_expansions: Option<u64>,

    /// Wall-clock limit in seconds for the bounded search phases.
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<f64>,

    /// Beam size for the beam-search fallback.
    #[arg(long, value_name = "N")]
    beam_width: Option<usize>,

    /// Rollout depth for the lookahead fallback.
    #[arg(long, value_name = "N")]
    lookahead_depth: Option<usize>,

    /// Candidates simulated per step by the lookahead fallback.
    #[arg(long, value_name = "N")]
    branch_factor: Option<usize>,

    /// Emit summary counters on stderr.
    #[arg(long)]
    verbose: bool,

    /// Emit a per-expansion trace on stderr.
    #[arg(long)]
    trace: bool,

    /// Print the naive topological baseline instead of scheduling.
    #[arg(long)]
    baseline: bool,
}

/// Algorithm choice as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
enum AlgorithmArg {
    Hybrid,
    Dfs,
    Heuristic,
    Lookahead,
    Beam,
    Greedy,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Hybrid => Algorithm::Hybrid,
            AlgorithmArg::Dfs => Algorithm::Dfs,
            AlgorithmArg::Heuristic => Algorithm::Heuristic,
            AlgorithmArg::Lookahead => Algorithm::Lookahead,
            AlgorithmArg::Beam => Algorithm::Beam,
            AlgorithmArg::Greedy => Algorithm::Greedy,
        }
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let input = match fs::read_to_string(&args.input) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("Failed to open input {}: {}", args.input, err);
            return ExitCode::from(1);
        }
    };
    let (total_memory, specs) = match parse_auto(&input) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("Parse error: {err}");
            return ExitCode::from(2);
        }
    };
    let problem = match Problem::new(total_memory, specs) {
        Ok(problem) => problem,
        Err(err) => {
            eprintln!("Invalid problem: {err}");
            return ExitCode::from(2);
        }
    };

    if args.baseline {
        print_baseline(&problem);
        return ExitCode::SUCCESS;
    }

    let policy = build_policy(&args, &problem);
    let result = solve(&problem, &policy);

    if !result.complete {
        eprintln!("No complete schedule found under the search budgets.");
        return ExitCode::from(3);
    }

    println!("Schedule (order):");
    let rendered: Vec<String> = result
        .state
        .execution_order
        .iter()
        .zip(&result.state.recompute_flags)
        .map(|(&id, &recompute)| {
            if recompute {
                format!("{}*", problem.name_of(id))
            } else {
                problem.name_of(id).to_string()
            }
        })
        .collect();
    println!("{}", rendered.join(" -> "));
    println!("* denotes recomputation");
    println!("Total time: {}", result.state.total_time);
    println!(
        "Memory peak: {} (limit={})",
        result.state.memory_peak,
        problem.total_memory()
    );

    if !result.feasible {
        eprintln!("No feasible schedule found under memory limit.");
        return ExitCode::from(3);
    }
    ExitCode::SUCCESS
}

fn build_policy(args: &CliArgs, problem: &Problem) -> SchedulePolicy {
    let mut config = SchedulerConfig::adaptive(problem.node_count());
    if let Some(max_expansions) = args.max_expansions {
        config.max_expansions = max_expansions;
    }
    if let Some(seconds) = args.time_limit {
        config.time_limit = Duration::from_secs_f64(seconds.max(0.0));
    }
    if let Some(beam_width) = args.beam_width {
        config.beam_width = beam_width;
    }
    if let Some(lookahead_depth) = args.lookahead_depth {
        config.lookahead_depth = lookahead_depth;
    }
    if let Some(branch_factor) = args.branch_factor {
        config.branch_factor = branch_factor;
    }
    config.verbose = args.verbose;
    config.trace = args.trace;
    SchedulePolicy {
        algorithm: args.algorithm.into(),
        config,
    }
}

fn print_baseline(problem: &Problem) {
    let baseline = baseline_schedule(problem);
    println!("Baseline schedule (topological):");
    let names: Vec<&str> = baseline
        .execution_order
        .iter()
        .map(|&id| problem.name_of(id))
        .collect();
    println!("{}", names.join(" -> "));
    println!("Total time: {}", baseline.total_time);
    println!("Naive memory peak (no freeing): {}", baseline.naive_peak);
}
