//! Observed state of the batch jobs backing vertices.

use serde::{Deserialize, Serialize};

/// Type of a job condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionType {
    Complete,
    Failed,
    /// Any condition type this core does not act on (e.g. `Suspended`).
    #[serde(other)]
    Other,
}

/// Status of a job condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A reported fact about a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCondition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    #[serde(default)]
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl JobCondition {
    pub fn new(condition_type: ConditionType, status: bool, message: &str) -> Self {
        Self {
            condition_type,
            status: if status {
                ConditionStatus::True
            } else {
                ConditionStatus::False
            },
            reason: None,
            message: message.to_string(),
        }
    }

    /// Check if the condition is set.
    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// A batch job as observed by the reconcile loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<JobCondition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_job() {
        let job: Job = serde_json::from_value(serde_json::json!({
            "name": "align",
            "conditions": [
                {"type": "Suspended", "status": "False"},
                {"type": "Failed", "status": "True", "reason": "BackoffLimitExceeded", "message": "oom"}
            ]
        }))
        .unwrap();

        assert_eq!(job.conditions[0].condition_type, ConditionType::Other);
        assert!(!job.conditions[0].is_true());
        assert_eq!(job.conditions[1].condition_type, ConditionType::Failed);
        assert!(job.conditions[1].is_true());
        assert_eq!(job.conditions[1].message, "oom");
    }

    #[test]
    fn test_missing_status_is_unknown() {
        let cond: JobCondition =
            serde_json::from_value(serde_json::json!({"type": "Complete"})).unwrap();
        assert_eq!(cond.status, ConditionStatus::Unknown);
        assert!(!cond.is_true());
    }
}
