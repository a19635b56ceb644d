//! Core data types for the scheduling system.

use thiserror::Error;

use crate::names::{NameTable, NodeId};

/// Errors detected while building a [`Problem`].
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Total memory budget is negative: {0}")]
    NegativeBudget(i64),
    #[error("Duplicate node name: {0}")]
    DuplicateNode(String),
    #[error("Node {node} references unknown input: {input}")]
    UnknownInput { node: String, input: String },
    #[error("Node {node} has a negative cost field")]
    NegativeCost { node: String },
    #[error("Dependency graph contains a cycle")]
    CycleDetected,
}

/// Raw description of one operator, as produced by the parsing layer.
#[derive(Clone, Debug)]
pub struct NodeSpec {
    pub name: String,
    pub inputs: Vec<String>,
    pub run_mem: i64,
    pub output_mem: i64,
    pub time_cost: i64,
}

/// One operator in the DAG.
///
/// `peak` is the memory the node itself needs while executing: the model
/// assumes the output is materialized before any input is released, so
/// workspace and result coexist at the instant of peak.
#[derive(Clone, Debug)]
pub struct Node {
    name: String,
    inputs: Vec<NodeId>,
    run_mem: i64,
    output_mem: i64,
    time_cost: i64,
    peak: i64,
    impact: i64,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ids of the operators whose outputs this node consumes, in input order.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn run_mem(&self) -> i64 {
        self.run_mem
    }

    pub fn output_mem(&self) -> i64 {
        self.output_mem
    }

    pub fn time_cost(&self) -> i64 {
        self.time_cost
    }

    /// Memory required on top of residents while this node runs.
    pub fn peak(&self) -> i64 {
        self.peak
    }

    /// Static net memory change: `output_mem` minus the sizes of inputs this
    /// node is the sole consumer of. The scheduler recomputes the dynamic
    /// variant against live state; this one is for inspection and ranking.
    pub fn impact(&self) -> i64 {
        self.impact
    }
}

/// Immutable scheduling problem: budget, operators, consumer lists.
///
/// Node ids are dense and assigned in input-spec order, so iterating
/// `0..node_count()` enumerates operators deterministically.
#[derive(Clone, Debug)]
pub struct Problem {
    total_memory: i64,
    nodes: Vec<Node>,
    /// Direct consumers of each node's output, preserving the order in which
    /// the consumers appeared in the input spec.
    consumers: Vec<Vec<NodeId>>,
    names: NameTable,
}

impl Problem {
    /// Build and validate a problem from parsed node specs.
    ///
    /// Inputs may reference nodes defined later in the sequence; cycles are
    /// still rejected. Fails fast on the first malformed spec.
    pub fn new(total_memory: i64, specs: Vec<NodeSpec>) -> Result<Self, GraphError> {
        if total_memory < 0 {
            return Err(GraphError::NegativeBudget(total_memory));
        }

        let mut names = NameTable::with_capacity(specs.len());
        for spec in &specs {
            if names.declare(&spec.name).is_none() {
                return Err(GraphError::DuplicateNode(spec.name.clone()));
            }
        }

        let mut nodes = Vec::with_capacity(specs.len());
        let mut consumers: Vec<Vec<NodeId>> = vec![Vec::new(); specs.len()];

        for (idx, spec) in specs.iter().enumerate() {
            if spec.run_mem < 0 || spec.output_mem < 0 || spec.time_cost < 0 {
                return Err(GraphError::NegativeCost {
                    node: spec.name.clone(),
                });
            }
            let mut inputs = Vec::with_capacity(spec.inputs.len());
            for input in &spec.inputs {
                let input_id = names.lookup(input).ok_or_else(|| GraphError::UnknownInput {
                    node: spec.name.clone(),
                    input: input.clone(),
                })?;
                inputs.push(input_id);
                consumers[input_id as usize].push(idx as NodeId);
            }
            nodes.push(Node {
                name: spec.name.clone(),
                inputs,
                run_mem: spec.run_mem,
                output_mem: spec.output_mem,
                time_cost: spec.time_cost,
                peak: spec.run_mem.max(spec.output_mem),
                impact: spec.output_mem,
            });
        }

        let problem = Self {
            total_memory,
            nodes,
            consumers,
            names,
        };
        problem.check_acyclic()?;
        Ok(problem.with_refined_impacts())
    }

    /// Kahn's algorithm over the consumer lists; every node must be emitted.
    fn check_acyclic(&self) -> Result<(), GraphError> {
        let n = self.nodes.len();
        let mut indegree: Vec<usize> = self.nodes.iter().map(|node| node.inputs.len()).collect();
        let mut queue: Vec<NodeId> = (0..n as NodeId).filter(|&id| indegree[id as usize] == 0).collect();
        let mut emitted = 0usize;

        while let Some(id) = queue.pop() {
            emitted += 1;
            for &consumer in &self.consumers[id as usize] {
                indegree[consumer as usize] -= 1;
                if indegree[consumer as usize] == 0 {
                    queue.push(consumer);
                }
            }
        }

        if emitted == n {
            Ok(())
        } else {
            Err(GraphError::CycleDetected)
        }
    }

    /// Refine each node's static impact: subtract inputs it solely consumes.
    fn with_refined_impacts(mut self) -> Self {
        let mut refined = Vec::with_capacity(self.nodes.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            let mut freed = 0i64;
            for &input in &node.inputs {
                let input_consumers = &self.consumers[input as usize];
                if input_consumers.len() == 1 && input_consumers[0] == idx as NodeId {
                    freed += self.nodes[input as usize].output_mem;
                }
            }
            refined.push(node.output_mem - freed);
        }
        for (node, impact) in self.nodes.iter_mut().zip(refined) {
            node.impact = impact;
        }
        self
    }

    pub fn total_memory(&self) -> i64 {
        self.total_memory
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    /// All nodes, in input-spec (id) order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Direct consumers of `id`'s output, in input-spec order.
    #[inline]
    pub fn consumers(&self, id: NodeId) -> &[NodeId] {
        &self.consumers[id as usize]
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.names.lookup(name)
    }

    pub fn name_of(&self, id: NodeId) -> &str {
        self.names.name(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_build_and_derived_fields() {
        let problem = Problem::new(
            100,
            vec![
                spec("a", &[], 10, 20, 1),
                spec("b", &["a"], 30, 5, 2),
                spec("c", &["a", "b"], 1, 1, 3),
            ],
        )
        .unwrap();

        assert_eq!(problem.node_count(), 3);
        assert_eq!(problem.total_memory(), 100);

        let a = problem.id_of("a").unwrap();
        let b = problem.id_of("b").unwrap();
        let c = problem.id_of("c").unwrap();

        assert_eq!(problem.node(a).peak(), 20);
        assert_eq!(problem.node(b).peak(), 30);
        assert_eq!(problem.consumers(a), &[b, c]);
        assert_eq!(problem.consumers(c), &[] as &[NodeId]);

        // b is a's non-sole consumer, so a's size is not subtracted from b;
        // c solely consumes b.
        assert_eq!(problem.node(b).impact(), 5);
        assert_eq!(problem.node(c).impact(), 1 - 5);
    }

    #[test]
    fn test_unknown_input_rejected() {
        let err = Problem::new(10, vec![spec("a", &["ghost"], 1, 1, 1)]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownInput { .. }));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let err = Problem::new(10, vec![spec("a", &[], 1, 1, 1), spec("a", &[], 1, 1, 1)])
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(_)));
    }

    #[test]
    fn test_negative_cost_rejected() {
        let err = Problem::new(10, vec![spec("a", &[], -1, 1, 1)]).unwrap_err();
        assert!(matches!(err, GraphError::NegativeCost { .. }));
    }

    #[test]
    fn test_negative_budget_rejected() {
        let err = Problem::new(-5, vec![]).unwrap_err();
        assert!(matches!(err, GraphError::NegativeBudget(-5)));
    }

    #[test]
    fn test_cycle_rejected() {
        // Forward references are allowed at build time, so a 2-cycle parses
        // but must fail the acyclicity check.
        let err = Problem::new(
            10,
            vec![spec("a", &["b"], 1, 1, 1), spec("b", &["a"], 1, 1, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected));
    }
}
