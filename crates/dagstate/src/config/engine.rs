//! Engine configuration.

use serde::Deserialize;

use crate::engine::status::TransitionPolicy;
use crate::engine::vertex_id::VertexIdStrategy;
use crate::error::StatusResult;

/// Engine configuration loaded from environment variables.
///
/// Environment variables are prefixed with `DAGSTATE_`:
/// - `DAGSTATE_VERTEX_ID`: Vertex ID derivation, `identity` or `sha256` (default: identity)
/// - `DAGSTATE_TRANSITION_POLICY`: `strict` or `advisory` (default: strict)
/// - `DAGSTATE_FAIL_FAST`: Fail the execution on the first failed vertex (default: true)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// How vertex IDs are derived from vertex names
    #[serde(default)]
    pub vertex_id: VertexIdStrategy,

    /// Whether the phase lattice is enforced
    #[serde(default)]
    pub transition_policy: TransitionPolicy,

    /// Fail the execution as soon as one vertex fails
    #[serde(default = "default_true")]
    pub fail_fast: bool,
}

fn default_true() -> bool {
    true
}

const PREFIX: &str = "DAGSTATE_";

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> StatusResult<Self> {
        Ok(envy::prefixed(PREFIX).from_env::<EngineConfig>()?)
    }

    /// Load configuration from explicit `(name, value)` pairs, names including the prefix.
    pub fn from_vars<I>(vars: I) -> StatusResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(PREFIX).from_iter::<_, EngineConfig>(vars)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vertex_id: VertexIdStrategy::default(),
            transition_policy: TransitionPolicy::default(),
            fail_fast: true,
        }
    }
}
