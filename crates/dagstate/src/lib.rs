//! dagstate
//!
//! Status-tracking and conditional-routing core of a DAG workflow
//! controller:
//!
//! - **Phase tracking**: monotone, idempotent phase transitions for an
//!   execution and each of its vertices
//! - **Job outcomes**: folds a backing job's conditions into a verdict
//! - **Match rules**: evaluates the predicates that gate conditional vertices
//! - **Reconcile**: one synchronous pass from observed jobs to updated status
//!
//! ## Modules
//!
//! - [`config`]: Engine configuration from environment variables
//! - [`engine`]: Rule evaluation, job outcomes and status transitions
//! - [`error`]: Error types
//! - [`model`]: Executions, graphs, jobs and match rules
//!
//! ## Example
//!
//! ```ignore
//! use dagstate::{config::EngineConfig, engine::StatusEngine, model::{Execution, Graph}};
//!
//! let engine = StatusEngine::new(EngineConfig::from_env()?);
//! let graph = Graph::new(vertices)?;
//! let mut exec = Execution::new("default", "wgs-run");
//! let report = engine.reconcile(&mut exec, &graph, &jobs, &context)?;
//! // dispatch report.ready, then persist exec
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod result_ext;

pub use error::{StatusError, StatusResult};
pub use result_ext::ResultExt;
