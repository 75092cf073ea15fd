//! Executor report - the terminal outcome message for an assigned task.

use serde::{Deserialize, Serialize};

use crate::TaskId;

/// A report sent by an executor for a previously assigned task.
///
/// `status` is kept as a raw string on the wire: the orchestrator
/// parses it leniently and must tolerate values it does not recognize
/// without corrupting ledger state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// The task this report is about.
    pub task_id: TaskId,

    /// Reported terminal status ("completed" or "failed").
    pub status: String,

    /// Optional executor output, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Optional error message for failed tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskReport {
    /// Build a completion report.
    pub fn completed(task_id: impl Into<TaskId>, output: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: "completed".to_owned(),
            output: Some(output.into()),
            error: None,
        }
    }

    /// Build a failure report.
    pub fn failed(task_id: impl Into<TaskId>, error: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: "failed".to_owned(),
            output: None,
            error: Some(error.into()),
        }
    }
}
