//! Task record - the unit of work tracked by the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TaskId, TaskStatus};

/// A Task represents one unit of work in an ordered plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier, immutable once assigned.
    pub id: TaskId,

    /// Free-text description, informational only.
    pub description: String,

    /// Current lifecycle status.
    #[serde(default)]
    pub status: TaskStatus,

    /// Error message, set only when the task fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the task entered the ledger.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last lifecycle transition.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending Task.
    pub fn new(id: impl Into<TaskId>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder method to set an initial status (plans may carry one).
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Transition to in_progress.
    pub fn mark_in_progress(&mut self) {
        self.status = TaskStatus::InProgress;
        self.updated_at = Utc::now();
    }

    /// Transition to completed. The error field is left untouched;
    /// only a failure transition writes it.
    pub fn mark_completed(&mut self) {
        self.status = TaskStatus::Completed;
        self.updated_at = Utc::now();
    }

    /// Transition to failed, recording the error message.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Return a failed task to pending, clearing its error.
    pub fn reset(&mut self) {
        self.status = TaskStatus::Pending;
        self.error = None;
        self.updated_at = Utc::now();
    }
}
