//! Per-vertex status records of one execution.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::error::{StatusError, StatusResult};
use crate::model::{Execution, Phase, Vertex, VertexStatus, VertexType};

use super::observer::{Subject, TransitionObserver};
use super::status::{check_transition, TransitionPolicy};
use super::vertex_id::VertexIdStrategy;

/// View over `Execution.status.vertices`.
///
/// Records are created by [`VertexStore::initialize`], inserted by the
/// caller, and afterwards only changed through phase transitions.
#[derive(Clone)]
pub struct VertexStore {
    ids: VertexIdStrategy,
    policy: TransitionPolicy,
    observer: Arc<dyn TransitionObserver>,
}

impl VertexStore {
    pub fn new(
        ids: VertexIdStrategy,
        policy: TransitionPolicy,
        observer: Arc<dyn TransitionObserver>,
    ) -> Self {
        Self {
            ids,
            policy,
            observer,
        }
    }

    /// Derive the status-map key for a vertex name.
    pub fn vertex_id(&self, vertex_name: &str) -> String {
        self.ids.vertex_id(vertex_name)
    }

    /// Build a fresh status record. Child IDs are derived from each child's job name.
    pub fn initialize(
        &self,
        vertex_name: &str,
        phase: Phase,
        message: &str,
        children: &[&Vertex],
    ) -> VertexStatus {
        debug!(target: "dagstate", vertex = %vertex_name, phase = %phase, "Initial vertex status");

        VertexStatus {
            id: self.vertex_id(vertex_name),
            name: vertex_name.to_string(),
            phase,
            message: message.to_string(),
            started_at: Some(Utc::now()),
            finished_at: None,
            children: children
                .iter()
                .map(|child| self.vertex_id(&child.job.name))
                .collect(),
            vertex_type: VertexType::Job,
        }
    }

    /// Insert a record built by [`VertexStore::initialize`], allocating the map if needed.
    ///
    /// An existing record with the same ID is kept.
    pub fn insert(&self, exec: &mut Execution, status: VertexStatus) {
        exec.status
            .vertices
            .get_or_insert_with(HashMap::new)
            .entry(status.id.clone())
            .or_insert(status);
    }

    /// Look up a vertex status by name.
    pub fn get<'a>(&self, exec: &'a Execution, vertex_name: &str) -> Option<&'a VertexStatus> {
        let id = self.vertex_id(vertex_name);
        exec.status.vertices.as_ref()?.get(&id)
    }

    /// Check if the vertex exists and reached a terminal phase.
    pub fn is_completed(&self, exec: &Execution, vertex_name: &str) -> bool {
        self.get(exec, vertex_name)
            .is_some_and(VertexStatus::is_completed)
    }

    /// Move a vertex to `phase` and set its message.
    ///
    /// The vertex must have been initialized. Under the strict policy an
    /// off-lattice move is rejected and nothing is written. `finished_at` is
    /// stamped the first time the vertex reaches a terminal phase.
    pub fn mark_phase(
        &self,
        exec: &mut Execution,
        vertex_name: &str,
        phase: Phase,
        message: &str,
    ) -> StatusResult<()> {
        let id = self.vertex_id(vertex_name);
        let status = exec
            .status
            .vertices
            .as_mut()
            .and_then(|vertices| vertices.get_mut(&id))
            .ok_or_else(|| StatusError::VertexNotInitialized {
                vertex: vertex_name.to_string(),
            })?;

        let subject = Subject::Vertex(status.name.clone());
        check_transition(self.policy, &subject, Some(status.phase), phase)?;

        if status.phase != phase {
            self.observer.phase_changed(&subject, Some(status.phase), phase);
            status.phase = phase;
        }

        if status.message != message {
            self.observer.message_changed(&subject, message);
            status.message = message.to_string();
        }

        if status.phase.is_terminal() && status.finished_at.is_none() {
            status.finished_at = Some(Utc::now());
        }

        Ok(())
    }

    pub fn mark_running(
        &self,
        exec: &mut Execution,
        vertex_name: &str,
        message: &str,
    ) -> StatusResult<()> {
        self.mark_phase(exec, vertex_name, Phase::Running, message)
    }

    pub fn mark_success(
        &self,
        exec: &mut Execution,
        vertex_name: &str,
        message: &str,
    ) -> StatusResult<()> {
        self.mark_phase(exec, vertex_name, Phase::Succeeded, message)
    }

    pub fn mark_failed(
        &self,
        exec: &mut Execution,
        vertex_name: &str,
        message: &str,
    ) -> StatusResult<()> {
        self.mark_phase(exec, vertex_name, Phase::Failed, message)
    }

    pub fn mark_error(
        &self,
        exec: &mut Execution,
        vertex_name: &str,
        err: impl Display,
    ) -> StatusResult<()> {
        self.mark_phase(exec, vertex_name, Phase::Error, &err.to_string())
    }
}
