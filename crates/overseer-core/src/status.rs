//! Status enums for Tasks and executor Reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Lifecycle status of a Task in the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task loaded from a plan, not yet assigned.
    #[default]
    Pending,
    /// Task is the current assignment, awaiting a report.
    InProgress,
    /// Task completed successfully.
    Completed,
    /// Task failed; stays failed until externally reset.
    Failed,
}

impl TaskStatus {
    /// Returns true if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the task can be handed to an executor.
    ///
    /// An in-progress task stays selectable so that repeated
    /// orchestration cycles re-return it instead of skipping it.
    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Terminal outcome reported by an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Executor finished the task successfully.
    Completed,
    /// Executor gave up on the task.
    Failed,
}

impl FromStr for ReportStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::UnrecognizedStatus(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_selectable_statuses() {
        assert!(TaskStatus::Pending.is_selectable());
        assert!(TaskStatus::InProgress.is_selectable());
        assert!(!TaskStatus::Completed.is_selectable());
        assert!(!TaskStatus::Failed.is_selectable());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: TaskStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, TaskStatus::Failed);
    }

    #[test]
    fn test_report_status_parse() {
        assert_eq!(
            "completed".parse::<ReportStatus>().unwrap(),
            ReportStatus::Completed
        );
        assert_eq!(
            "failed".parse::<ReportStatus>().unwrap(),
            ReportStatus::Failed
        );
        assert!("running".parse::<ReportStatus>().is_err());
    }
}
