//! Error types for the status engine.
//!
//! Only integrity problems surface as errors. Rule evaluation and job
//! outcome resolution never fail; they degrade to "not satisfied" or
//! "not finished" instead.

use thiserror::Error;

use crate::engine::observer::Subject;
use crate::model::{phase::display_phase, GraphError, Phase};

/// Status engine errors.
#[derive(Error, Debug)]
pub enum StatusError {
    /// A phase transition was requested for a vertex that has no status record.
    #[error("Vertex not initialized: {vertex}")]
    VertexNotInitialized { vertex: String },

    /// The requested move is not part of the phase lattice.
    #[error("Illegal transition for {subject}: {} -> {to}", display_phase(.from))]
    IllegalTransition {
        subject: Subject,
        from: Option<Phase>,
        to: Phase,
    },

    /// Graph invariant violation
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using StatusError.
pub type StatusResult<T> = Result<T, StatusError>;

impl From<envy::Error> for StatusError {
    fn from(err: envy::Error) -> Self {
        StatusError::Config(err.to_string())
    }
}
