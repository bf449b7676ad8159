//! Lifecycle phase shared by executions and vertices.

use serde::{Deserialize, Serialize};

/// Phase of an execution or of a single vertex.
///
/// ```text
/// Pending -> Running -> Succeeded
///                    -> Failed
///                    -> Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Known but not started.
    Pending,
    /// Backing work is in flight.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished and the work reported a failure.
    Failed,
    /// Finished because the controller hit an error.
    Error,
}

impl Phase {
    /// Check if no further transitions are expected from this phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Error)
    }

    /// Check if moving from `self` to `to` follows the lattice.
    ///
    /// Staying in the same phase is always allowed so repeated writes stay idempotent.
    pub fn can_transition_to(&self, to: Phase) -> bool {
        if *self == to {
            return true;
        }
        match self {
            Self::Pending => true,
            Self::Running => to.is_terminal(),
            Self::Succeeded | Self::Failed | Self::Error => false,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Display helper for an optional phase; the zero phase renders as an empty string.
pub(crate) fn display_phase(phase: &Option<Phase>) -> String {
    phase.map(|p| p.to_string()).unwrap_or_default()
}
