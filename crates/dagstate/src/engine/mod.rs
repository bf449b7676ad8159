//! Status tracking and conditional routing engine.
//!
//! - **Rules**: evaluates match rules against a key/value context
//! - **Job outcome**: maps a job's condition list to a verdict
//! - **Vertex store**: per-vertex status records of an execution
//! - **Status**: execution-level phase transitions
//! - **Reconcile**: one pass tying the pieces together
//!
//! Everything here is synchronous and in-memory. Callers own fetching,
//! dispatching and persisting.

pub mod job_outcome;
pub mod observer;
pub mod reconcile;
pub mod rules;
pub mod status;
pub mod vertex_id;
pub mod vertex_store;

pub use job_outcome::{is_job_finished, job_outcome, JobOutcome};
pub use observer::{NoopObserver, Subject, TracingObserver, TransitionObserver};
pub use reconcile::ReconcileReport;
pub use rules::{rule_satisfied, rules_satisfied};
pub use status::{is_execution_completed, StatusEngine, TransitionPolicy};
pub use vertex_id::VertexIdStrategy;
pub use vertex_store::VertexStore;
