//! Memory-bounded execution scheduling for operator DAGs.
//!
//! Given a DAG of compute operators with workspace sizes, output sizes, and
//! time costs, find an execution order whose peak memory stays within a hard
//! budget while total time stays low. When a plain topological order cannot
//! fit, the scheduler reorders toward memory-freeing operators, evicts
//! resident outputs, and recomputes them later from still-resident inputs.

pub mod baseline;
pub mod config;
pub mod logging;
pub mod models;
pub mod names;
pub mod parser;
pub mod scheduler;
pub mod sorting;

pub use config::{Algorithm, SchedulePolicy, SchedulerConfig};
pub use names::NodeId;
pub use models::{GraphError, Node, NodeSpec, Problem};
pub use parser::{parse_auto, ParseError};
pub use scheduler::{solve, DebugStats, ScheduleResult, ScheduleState};
