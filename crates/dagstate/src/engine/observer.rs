//! Transition observers.
//!
//! The engine reports every effective phase or message change to an
//! observer instead of logging directly, so callers decide where the
//! record goes.

use tracing::debug;

use crate::model::{phase::display_phase, Phase};

/// Entity whose status changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Execution, by work-queue key.
    Execution(String),
    /// Vertex, by name.
    Vertex(String),
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Execution(key) => write!(f, "execution {}", key),
            Self::Vertex(name) => write!(f, "vertex {}", name),
        }
    }
}

/// Receives status changes. Only effective changes are reported; rewriting
/// an identical phase or message produces no call.
pub trait TransitionObserver: Send + Sync {
    fn phase_changed(&self, subject: &Subject, from: Option<Phase>, to: Phase);

    fn message_changed(&self, _subject: &Subject, _message: &str) {}
}

/// Observer that emits `tracing` debug records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransitionObserver for TracingObserver {
    fn phase_changed(&self, subject: &Subject, from: Option<Phase>, to: Phase) {
        debug!(
            target: "dagstate",
            subject = %subject,
            from = %display_phase(&from),
            to = %to,
            "Phase transition"
        );
    }

    fn message_changed(&self, subject: &Subject, message: &str) {
        debug!(target: "dagstate", subject = %subject, message = %message, "Status message updated");
    }
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TransitionObserver for NoopObserver {
    fn phase_changed(&self, _subject: &Subject, _from: Option<Phase>, _to: Phase) {}
}
