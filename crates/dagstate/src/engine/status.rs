//! Execution-level phase transitions.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::error::{StatusError, StatusResult};
use crate::model::{Execution, Phase};

use super::observer::{Subject, TracingObserver, TransitionObserver};
use super::vertex_store::VertexStore;

/// Whether phase moves are checked against the lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Off-lattice moves fail with [`StatusError::IllegalTransition`].
    #[default]
    Strict,
    /// Any move is applied; keeping transitions forward is the caller's job.
    Advisory,
}

pub(crate) fn check_transition(
    policy: TransitionPolicy,
    subject: &Subject,
    from: Option<Phase>,
    to: Phase,
) -> StatusResult<()> {
    match (policy, from) {
        (TransitionPolicy::Strict, Some(current)) if !current.can_transition_to(to) => {
            Err(StatusError::IllegalTransition {
                subject: subject.clone(),
                from,
                to,
            })
        }
        _ => Ok(()),
    }
}

/// Check if the execution reached a terminal phase.
pub fn is_execution_completed(exec: &Execution) -> bool {
    exec.status.phase.is_some_and(|p| p.is_terminal())
}

/// Drives execution and vertex phases for one execution at a time.
///
/// The engine holds no per-execution state; every call mutates the
/// `Execution` passed in and leaves persisting it to the caller.
#[derive(Clone)]
pub struct StatusEngine {
    config: EngineConfig,
    observer: Arc<dyn TransitionObserver>,
    vertices: VertexStore,
}

impl Default for StatusEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl StatusEngine {
    /// Create an engine that reports transitions through `tracing`.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    pub fn with_observer(config: EngineConfig, observer: Arc<dyn TransitionObserver>) -> Self {
        let vertices = VertexStore::new(
            config.vertex_id,
            config.transition_policy,
            observer.clone(),
        );
        Self {
            config,
            observer,
            vertices,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Per-vertex operations.
    pub fn vertices(&self) -> &VertexStore {
        &self.vertices
    }

    /// Move the execution to `phase` and set its message.
    ///
    /// Also stamps `started_at` if unset, stamps `finished_at` the first time
    /// the execution is completed, and allocates the vertex map if missing.
    pub fn mark_execution_phase(
        &self,
        exec: &mut Execution,
        phase: Phase,
        message: &str,
    ) -> StatusResult<()> {
        let subject = Subject::Execution(exec.key());
        check_transition(
            self.config.transition_policy,
            &subject,
            exec.status.phase,
            phase,
        )?;

        let status = &mut exec.status;
        if status.phase != Some(phase) {
            self.observer.phase_changed(&subject, status.phase, phase);
            status.phase = Some(phase);
        }

        if status.started_at.is_none() {
            status.started_at = Some(Utc::now());
        }

        if status.message != message {
            self.observer.message_changed(&subject, message);
            status.message = message.to_string();
        }

        if phase.is_terminal() && status.finished_at.is_none() {
            status.finished_at = Some(Utc::now());
        }

        if status.vertices.is_none() {
            status.vertices = Some(HashMap::new());
        }

        Ok(())
    }

    pub fn mark_execution_running(
        &self,
        exec: &mut Execution,
        message: &str,
    ) -> StatusResult<()> {
        self.mark_execution_phase(exec, Phase::Running, message)
    }

    pub fn mark_execution_success(
        &self,
        exec: &mut Execution,
        message: &str,
    ) -> StatusResult<()> {
        self.mark_execution_phase(exec, Phase::Succeeded, message)
    }

    pub fn mark_execution_failed(
        &self,
        exec: &mut Execution,
        message: &str,
    ) -> StatusResult<()> {
        self.mark_execution_phase(exec, Phase::Failed, message)
    }

    pub fn mark_execution_error(
        &self,
        exec: &mut Execution,
        err: impl Display,
    ) -> StatusResult<()> {
        self.mark_execution_phase(exec, Phase::Error, &err.to_string())
    }

    pub fn is_execution_completed(&self, exec: &Execution) -> bool {
        is_execution_completed(exec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::observer::testing::{Change, RecordingObserver};
    use crate::model::Vertex;

    fn advisory() -> EngineConfig {
        EngineConfig {
            transition_policy: TransitionPolicy::Advisory,
            ..Default::default()
        }
    }

    #[test]
    fn test_is_completed() {
        let mut exec = Execution::default();
        assert!(!is_execution_completed(&exec));
        for (phase, completed) in [
            (Phase::Pending, false),
            (Phase::Running, false),
            (Phase::Succeeded, true),
            (Phase::Failed, true),
            (Phase::Error, true),
        ] {
            exec.status.phase = Some(phase);
            assert_eq!(is_execution_completed(&exec), completed, "{phase}");
        }
    }

    #[test]
    fn test_running_stamps_started_only() {
        let engine = StatusEngine::default();
        let mut exec = Execution::new("default", "run");

        engine.mark_execution_running(&mut exec, "").unwrap();
        assert_eq!(exec.status.phase, Some(Phase::Running));
        assert!(exec.status.started_at.is_some());
        assert!(exec.status.finished_at.is_none());
        assert_eq!(exec.status.vertices, Some(HashMap::new()));
    }

    #[test]
    fn test_zero_execution_gets_vertex_map() {
        let engine = StatusEngine::default();
        let mut exec = Execution::default();
        assert!(exec.status.vertices.is_none());

        engine.mark_execution_phase(&mut exec, Phase::Pending, "").unwrap();
        assert_eq!(exec.status.vertices, Some(HashMap::new()));
        assert!(exec.status.started_at.is_some());
    }

    #[test]
    fn test_existing_vertices_untouched() {
        let engine = StatusEngine::default();
        let mut exec = Execution::new("default", "run");
        let status = engine.vertices().initialize("a", Phase::Pending, "", &[]);
        engine.vertices().insert(&mut exec, status);
        let before = exec.status.vertices.clone();

        engine.mark_execution_running(&mut exec, "").unwrap();
        assert_eq!(exec.status.vertices, before);
    }

    #[test]
    fn test_finished_at_set_once() {
        let engine = StatusEngine::new(advisory());
        let mut exec = Execution::new("default", "run");

        engine.mark_execution_success(&mut exec, "done").unwrap();
        let started = exec.status.started_at;
        let finished = exec.status.finished_at;
        assert!(finished.is_some());

        engine.mark_execution_failed(&mut exec, "late failure").unwrap();
        engine.mark_execution_running(&mut exec, "restart").unwrap();
        engine.mark_execution_error(&mut exec, "boom").unwrap();
        assert_eq!(exec.status.finished_at, finished);
        assert_eq!(exec.status.started_at, started);
    }

    #[test]
    fn test_idempotent_success() {
        let engine = StatusEngine::default();
        let mut exec = Execution::new("default", "run");
        engine.mark_execution_running(&mut exec, "").unwrap();

        engine.mark_execution_success(&mut exec, "all done").unwrap();
        let once = exec.clone();
        engine.mark_execution_success(&mut exec, "all done").unwrap();
        assert_eq!(exec, once);
    }

    #[test]
    fn test_strict_rejects_leaving_terminal() {
        let engine = StatusEngine::default();
        let mut exec = Execution::new("default", "run");
        engine.mark_execution_failed(&mut exec, "oom").unwrap();
        let before = exec.clone();

        let err = engine.mark_execution_running(&mut exec, "retry").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Illegal transition for execution default/run: Failed -> Running"
        );
        assert_eq!(exec, before);
    }

    #[test]
    fn test_zero_phase_may_move_anywhere() {
        let engine = StatusEngine::default();
        let mut exec = Execution::default();
        engine.mark_execution_error(&mut exec, "bad graph").unwrap();
        assert_eq!(exec.status.phase, Some(Phase::Error));
        assert_eq!(exec.status.message, "bad graph");
        assert!(exec.status.finished_at.is_some());
    }

    #[test]
    fn test_engine_uses_configured_id_strategy() {
        let engine = StatusEngine::new(EngineConfig {
            vertex_id: crate::engine::VertexIdStrategy::Sha256,
            ..Default::default()
        });
        let child = Vertex::new("abc", &[]);
        let status = engine
            .vertices()
            .initialize("root", Phase::Pending, "", &[&child]);
        assert_eq!(status.children, vec!["ba7816bf8f01cfea"]);
    }

    #[test]
    fn test_observer_receives_execution_changes() {
        let observer = Arc::new(RecordingObserver::default());
        let engine = StatusEngine::with_observer(EngineConfig::default(), observer.clone());
        let mut exec = Execution::new("gene", "run");

        engine.mark_execution_running(&mut exec, "").unwrap();
        engine.mark_execution_running(&mut exec, "").unwrap();
        engine.mark_execution_success(&mut exec, "done").unwrap();

        let subject = Subject::Execution("gene/run".to_string());
        assert_eq!(
            observer.changes(),
            vec![
                Change::Phase(subject.clone(), Some(Phase::Pending), Phase::Running),
                Change::Phase(subject.clone(), Some(Phase::Running), Phase::Succeeded),
                Change::Message(subject, "done".to_string()),
            ]
        );
    }
}
