//! Naive topological baseline.
//!
//! Kahn's algorithm with no input freeing: every output stays resident
//! forever. The resulting peak is the number to beat; the total time is a
//! lower bound shared with any schedule that never recomputes.

use std::collections::VecDeque;

use crate::names::NodeId;
use crate::models::Problem;

/// Result of the naive topological walk.
#[derive(Clone, Debug)]
pub struct BaselineSchedule {
    pub execution_order: Vec<NodeId>,
    pub total_time: i64,
    /// Peak with every output accumulated and nothing freed.
    pub naive_peak: i64,
}

/// Topological order in input-spec order among simultaneously-ready nodes.
/// `Problem` construction already rejected cycles, so this always covers the
/// whole graph.
pub fn baseline_schedule(problem: &Problem) -> BaselineSchedule {
    let n = problem.node_count();
    let mut indegree: Vec<usize> = problem.nodes().iter().map(|node| node.inputs().len()).collect();
    let mut queue: VecDeque<NodeId> = (0..n as NodeId)
        .filter(|&id| indegree[id as usize] == 0)
        .collect();

    let mut order = Vec::with_capacity(n);
    let mut total_time = 0i64;
    let mut current_memory = 0i64;
    let mut naive_peak = 0i64;

    while let Some(id) = queue.pop_front() {
        order.push(id);
        let node = problem.node(id);
        total_time += node.time_cost();
        current_memory += node.output_mem();
        naive_peak = naive_peak.max(current_memory);

        for &consumer in problem.consumers(id) {
            indegree[consumer as usize] -= 1;
            if indegree[consumer as usize] == 0 {
                queue.push_back(consumer);
            }
        }
    }

    debug_assert_eq!(order.len(), n);
    BaselineSchedule {
        execution_order: order,
        total_time,
        naive_peak,
    }
}
