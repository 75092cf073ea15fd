//! Plan input - the ordered task list consumed by the orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CoreError, Task, TaskId, TaskStatus};

/// One task entry as supplied by a plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTask {
    /// Caller-assigned task identifier.
    pub id: TaskId,

    /// Free-text description.
    pub description: String,

    /// Optional initial status; defaults to pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// An ordered project plan.
///
/// A plan replaces the whole ledger when loaded; there are no merge
/// semantics with a previously loaded plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Tasks in execution order.
    pub tasks: Vec<PlanTask>,
}

impl Plan {
    /// Parse a plan from a raw JSON string.
    ///
    /// Malformed JSON or a missing `tasks` key is rejected rather than
    /// defaulted: an accidentally empty plan would silently erase prior
    /// orchestration intent.
    pub fn from_json(input: &str) -> Result<Self, CoreError> {
        serde_json::from_str(input).map_err(|e| CoreError::InvalidPlan(e.to_string()))
    }

    /// Parse a plan from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(|e| CoreError::InvalidPlan(e.to_string()))
    }

    /// Materialize the plan into ledger task records.
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
            .into_iter()
            .map(|entry| {
                let status = entry.status.unwrap_or_default();
                Task::new(entry.id, entry.description).with_status(status)
            })
            .collect()
    }
}
