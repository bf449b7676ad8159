//! Execution and per-vertex status records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Identity of a stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    /// Opaque version used by the store for optimistic concurrency. Never touched here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

impl ObjectMeta {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            resource_version: None,
        }
    }

    /// Work-queue key: `namespace/name`, or just `name` for cluster-scoped objects.
    pub fn key(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

/// Kind of work backing a vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VertexType {
    /// Backed by a batch job.
    #[default]
    Job,
    #[serde(other)]
    Unknown,
}

/// Status of one vertex within an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexStatus {
    pub id: String,
    pub name: String,
    pub phase: Phase,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// IDs of the child vertices, captured at initialization.
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, rename = "type")]
    pub vertex_type: VertexType,
}

impl VertexStatus {
    /// Check if the vertex reached a terminal phase.
    pub fn is_completed(&self) -> bool {
        self.phase.is_terminal()
    }
}

/// Observed state of an execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatus {
    /// `None` is the zero phase of an object nobody has touched yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Vertex statuses keyed by vertex ID. Allocated lazily on the first transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices: Option<HashMap<String, VertexStatus>>,
}

/// One run of a workflow graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: ExecutionStatus,
}

impl Execution {
    /// Create a pending execution with an empty vertex map.
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            status: ExecutionStatus {
                phase: Some(Phase::Pending),
                vertices: Some(HashMap::new()),
                ..Default::default()
            },
        }
    }

    /// Work-queue key of this execution.
    pub fn key(&self) -> String {
        self.metadata.key()
    }

    /// Vertex statuses, empty when the map was never allocated.
    pub fn vertices(&self) -> impl Iterator<Item = &VertexStatus> {
        self.status.vertices.iter().flat_map(|v| v.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        assert_eq!(ObjectMeta::new("gene", "wgs-1").key(), "gene/wgs-1");
        assert_eq!(ObjectMeta::new("", "wgs-1").key(), "wgs-1");
    }

    #[test]
    fn test_new_execution_is_pending() {
        let exec = Execution::new("default", "run");
        assert_eq!(exec.status.phase, Some(Phase::Pending));
        assert_eq!(exec.status.vertices.as_ref().map(|v| v.len()), Some(0));
        assert!(exec.status.started_at.is_none());
        assert!(exec.status.finished_at.is_none());
    }

    #[test]
    fn test_decode_zero_execution() {
        let exec: Execution =
            serde_json::from_value(serde_json::json!({"metadata": {"name": "run"}})).unwrap();
        assert_eq!(exec.status.phase, None);
        assert!(exec.status.vertices.is_none());
        assert_eq!(exec.vertices().count(), 0);
    }

    #[test]
    fn test_vertex_status_serialization() {
        let status = VertexStatus {
            id: "align".to_string(),
            name: "align".to_string(),
            phase: Phase::Running,
            message: String::new(),
            started_at: None,
            finished_at: None,
            children: vec!["sort".to_string()],
            vertex_type: VertexType::Job,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["type"], "job");
        assert_eq!(json["phase"], "Running");
        assert!(json.get("finishedAt").is_none());

        let decoded: VertexStatus = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, status);
    }

    #[test]
    fn test_unknown_vertex_type() {
        let vt: VertexType = serde_json::from_str("\"container\"").unwrap();
        assert_eq!(vt, VertexType::Unknown);
    }
}
