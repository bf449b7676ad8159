//! Data model shared by the status engine and its collaborators.
//!
//! - **Phase**: lifecycle lattice for executions and vertices
//! - **Execution**: one run of a graph with its per-vertex status map
//! - **Graph**: validated DAG of job-backed vertices
//! - **Job**: condition list reported by a backing job
//! - **Rule**: match rules gating conditional vertices

pub mod execution;
pub mod graph;
pub mod job;
pub mod phase;
pub mod rule;

pub use execution::{Execution, ExecutionStatus, ObjectMeta, VertexStatus, VertexType};
pub use graph::{Graph, GraphError, JobRef, Vertex};
pub use job::{ConditionStatus, ConditionType, Job, JobCondition};
pub use phase::Phase;
pub use rule::{MatchOperator, MatchRule};
