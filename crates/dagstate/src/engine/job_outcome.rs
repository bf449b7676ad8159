//! Terminal outcome of a backing job.
//!
//! Conditions are scanned in list order and the first `Complete` or
//! `Failed` condition with status `True` wins. A well-formed job never has
//! both set; if it does, the earlier entry decides.

use crate::model::{ConditionType, JobCondition};

/// Verdict derived from a job's condition list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// No terminal condition is set yet.
    Unfinished,
    /// The job completed; carries the condition message.
    Complete(String),
    /// The job failed; carries the condition message.
    Failed(String),
}

impl JobOutcome {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Unfinished)
    }

    /// Condition message, empty while unfinished.
    pub fn message(&self) -> &str {
        match self {
            Self::Unfinished => "",
            Self::Complete(m) | Self::Failed(m) => m.as_str(),
        }
    }
}

/// Resolve the outcome of a job from its conditions.
pub fn job_outcome(conditions: &[JobCondition]) -> JobOutcome {
    for c in conditions.iter().filter(|c| c.is_true()) {
        match c.condition_type {
            ConditionType::Complete => return JobOutcome::Complete(c.message.clone()),
            ConditionType::Failed => return JobOutcome::Failed(c.message.clone()),
            ConditionType::Other => {}
        }
    }
    JobOutcome::Unfinished
}

/// Check if any `Complete` or `Failed` condition is set.
pub fn is_job_finished(conditions: &[JobCondition]) -> bool {
    conditions.iter().any(|c| {
        matches!(
            c.condition_type,
            ConditionType::Complete | ConditionType::Failed
        ) && c.is_true()
    })
}
