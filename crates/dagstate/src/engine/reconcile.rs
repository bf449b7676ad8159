//! One synchronous reconcile pass over an execution.
//!
//! The pass folds observed job conditions into vertex phases, admits
//! vertices whose parents succeeded and whose match rules hold, and then
//! recomputes the execution phase. It performs no I/O: the caller fetches
//! the inputs, dispatches the jobs listed in [`ReconcileReport::ready`] and
//! persists the execution afterwards.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::StatusResult;
use crate::model::{Execution, Graph, Job, Phase, Vertex};

use super::job_outcome::{job_outcome, JobOutcome};
use super::rules::rules_satisfied;
use super::status::{is_execution_completed, StatusEngine};

/// What a reconcile pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Vertices initialized in this pass. Their jobs should be dispatched.
    pub ready: Vec<String>,
    /// Vertices that will never run.
    pub skipped: Vec<String>,
    /// Vertices that reached a terminal phase in this pass.
    pub finished: Vec<String>,
    /// Whether the execution is completed after this pass.
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexState {
    /// Has a status record in this phase.
    Tracked(Phase),
    /// Parents are still in flight.
    Waiting,
    /// A parent did not succeed, or a match rule failed.
    Skipped,
}

impl VertexState {
    fn in_flight(&self) -> bool {
        match self {
            Self::Tracked(phase) => !phase.is_terminal(),
            Self::Waiting => true,
            Self::Skipped => false,
        }
    }
}

impl StatusEngine {
    /// Run one reconcile pass.
    ///
    /// `jobs` maps job names to the jobs observed for this execution; a
    /// missing entry means the job was not created yet. `context` is the
    /// key/value map match rules are evaluated against.
    pub fn reconcile(
        &self,
        exec: &mut Execution,
        graph: &Graph,
        jobs: &HashMap<String, Job>,
        context: &HashMap<String, String>,
    ) -> StatusResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        if is_execution_completed(exec) {
            debug!(target: "dagstate", execution = %exec.key(), "Execution already completed");
            report.completed = true;
            return Ok(report);
        }

        if exec.status.phase != Some(Phase::Running) {
            self.mark_execution_running(exec, "execution is running")?;
        }

        let mut tracked: HashMap<&str, Phase> = HashMap::new();
        for vertex in graph.topological_order() {
            if let Some(phase) = self.vertices().get(exec, &vertex.name).map(|s| s.phase) {
                let phase = self.advance(exec, vertex, phase, jobs, &mut report)?;
                tracked.insert(vertex.name.as_str(), phase);
            }
        }

        // A failure that ends the execution in this pass stops new work.
        let halted = self.config().fail_fast
            && tracked
                .values()
                .any(|p| matches!(p, Phase::Failed | Phase::Error));

        let mut states: Vec<(&str, VertexState)> = Vec::with_capacity(graph.len());
        for vertex in graph.topological_order() {
            let state = match tracked.get(vertex.name.as_str()) {
                Some(&phase) => VertexState::Tracked(phase),
                None => {
                    let parents: Vec<VertexState> = graph
                        .parents_of(&vertex.name)
                        .iter()
                        .filter_map(|p| states.iter().find(|(n, _)| *n == p.name))
                        .map(|(_, s)| *s)
                        .collect();
                    self.admit(exec, graph, vertex, &parents, context, halted, &mut report)
                }
            };
            states.push((vertex.name.as_str(), state));
        }

        self.settle(exec, &states)?;
        report.completed = is_execution_completed(exec);

        info!(
            target: "dagstate",
            execution = %exec.key(),
            phase = ?exec.status.phase,
            ready = report.ready.len(),
            skipped = report.skipped.len(),
            finished = report.finished.len(),
            "Reconcile pass complete"
        );

        Ok(report)
    }

    // Fold the backing job's conditions into a tracked vertex.
    fn advance(
        &self,
        exec: &mut Execution,
        vertex: &Vertex,
        phase: Phase,
        jobs: &HashMap<String, Job>,
        report: &mut ReconcileReport,
    ) -> StatusResult<Phase> {
        if phase.is_terminal() {
            return Ok(phase);
        }
        let Some(job) = jobs.get(&vertex.job.name) else {
            return Ok(phase);
        };

        let next = match job_outcome(&job.conditions) {
            JobOutcome::Complete(message) => {
                self.vertices().mark_success(exec, &vertex.name, &message)?;
                Phase::Succeeded
            }
            JobOutcome::Failed(message) => {
                self.vertices().mark_failed(exec, &vertex.name, &message)?;
                Phase::Failed
            }
            JobOutcome::Unfinished => {
                if phase == Phase::Pending {
                    let message = format!("job {} is running", job.name);
                    self.vertices().mark_running(exec, &vertex.name, &message)?;
                }
                Phase::Running
            }
        };

        if next.is_terminal() {
            report.finished.push(vertex.name.clone());
        }
        Ok(next)
    }

    // Decide whether an untracked vertex may start. A halted pass never
    // initializes new vertices.
    #[allow(clippy::too_many_arguments)]
    fn admit(
        &self,
        exec: &mut Execution,
        graph: &Graph,
        vertex: &Vertex,
        parents: &[VertexState],
        context: &HashMap<String, String>,
        halted: bool,
        report: &mut ReconcileReport,
    ) -> VertexState {
        let blocked = parents.iter().any(|p| match p {
            VertexState::Skipped => true,
            VertexState::Tracked(phase) => phase.is_terminal() && *phase != Phase::Succeeded,
            VertexState::Waiting => false,
        });
        if blocked {
            report.skipped.push(vertex.name.clone());
            return VertexState::Skipped;
        }

        if parents.iter().any(|p| *p != VertexState::Tracked(Phase::Succeeded)) {
            return VertexState::Waiting;
        }

        if !rules_satisfied(&vertex.when, context) {
            debug!(target: "dagstate", vertex = %vertex.name, "Match rules not satisfied, skipping");
            report.skipped.push(vertex.name.clone());
            return VertexState::Skipped;
        }

        if halted {
            return VertexState::Waiting;
        }

        let children = graph.children_of(&vertex.name);
        let status = self.vertices().initialize(&vertex.name, Phase::Pending, "", &children);
        self.vertices().insert(exec, status);
        report.ready.push(vertex.name.clone());
        VertexState::Tracked(Phase::Pending)
    }

    // Derive the execution phase from the vertex states.
    fn settle(&self, exec: &mut Execution, states: &[(&str, VertexState)]) -> StatusResult<()> {
        let in_flight = states.iter().any(|(_, s)| s.in_flight());
        if in_flight && !self.config().fail_fast {
            return Ok(());
        }

        let first_with = |phase: Phase| {
            states
                .iter()
                .find(|(_, s)| *s == VertexState::Tracked(phase))
                .map(|(name, _)| *name)
        };

        if let Some(name) = first_with(Phase::Error) {
            let message = self.vertex_message(exec, name, "errored");
            return self.mark_execution_phase(exec, Phase::Error, &message);
        }
        if let Some(name) = first_with(Phase::Failed) {
            let message = self.vertex_message(exec, name, "failed");
            return self.mark_execution_failed(exec, &message);
        }
        if !in_flight {
            return self.mark_execution_success(exec, "all vertices finished");
        }
        Ok(())
    }

    fn vertex_message(&self, exec: &Execution, name: &str, verb: &str) -> String {
        match self.vertices().get(exec, name) {
            Some(status) if !status.message.is_empty() => {
                format!("vertex {} {}: {}", name, verb, status.message)
            }
            _ => format!("vertex {} {}", name, verb),
        }
    }
}
