//! Executor shim - the message-passing contract with executors.
//!
//! Assignments flow orchestrator -> executor on one channel, terminal
//! reports flow back on another. The orchestrator places no liveness
//! requirement on an executor: an assigned task with no report stays
//! in_progress until a report arrives or a new plan is loaded.

use tokio::sync::mpsc;
use tracing::{info, warn};

use overseer_core::{TaskId, TaskReport};

/// A task handed to an executor.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskAssignment {
    pub task_id: TaskId,
    pub description: String,
}

/// Buffer size for the assignment and report channels. One task is in
/// flight at a time, so a small buffer only has to absorb bursts of
/// cycle requests.
pub const CHANNEL_CAPACITY: usize = 16;

/// Create the assignment channel pair.
pub fn assignment_channel() -> (mpsc::Sender<TaskAssignment>, mpsc::Receiver<TaskAssignment>) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Create the report channel pair.
pub fn report_channel() -> (mpsc::Sender<TaskReport>, mpsc::Receiver<TaskReport>) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// In-process stand-in for a real executor.
///
/// Consumes assignments and sends exactly one completion report per
/// assignment. Real executors live out of process and report over
/// HTTP instead; this one exists for demos and for exercising the
/// full assignment/report loop.
pub struct LocalExecutor {
    assignments: mpsc::Receiver<TaskAssignment>,
    reports: mpsc::Sender<TaskReport>,
}

impl LocalExecutor {
    pub fn new(
        assignments: mpsc::Receiver<TaskAssignment>,
        reports: mpsc::Sender<TaskReport>,
    ) -> Self {
        Self {
            assignments,
            reports,
        }
    }

    /// Drain assignments until the channel closes.
    pub async fn run(mut self) {
        while let Some(assignment) = self.assignments.recv().await {
            info!(
                task_id = %assignment.task_id,
                description = %assignment.description,
                "Executing task"
            );

            // Stubbed execution. A real executor performs the work out
            // of band before reporting.
            let output = format!("Task {} executed successfully.", assignment.task_id);
            let report = TaskReport::completed(assignment.task_id.clone(), output);

            if self.reports.send(report).await.is_err() {
                warn!(
                    task_id = %assignment.task_id,
                    "Report channel closed, stopping executor"
                );
                break;
            }
        }
    }
}
