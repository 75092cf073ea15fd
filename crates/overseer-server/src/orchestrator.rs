//! Orchestrator - thin coordination layer over the ledger and store.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use overseer_core::{Plan, ReportStatus, Task, TaskId, TaskReport};

use crate::executor::TaskAssignment;
use crate::ledger::{StatusSnapshot, TaskLedger};
use crate::metrics::MetricsSink;
use crate::session::SessionStore;

/// Fallback error message for failure reports that carry none.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Single-instance orchestrator. The surrounding transport must
/// serialize all mutations behind one exclusion boundary; nothing in
/// here is safe to interleave.
pub struct Orchestrator {
    ledger: TaskLedger,
    metrics: Arc<MetricsSink>,
    assignments: Option<mpsc::Sender<TaskAssignment>>,
}

impl Orchestrator {
    /// Build an orchestrator on top of a session store, restoring any
    /// persisted ledger state.
    pub fn new(store: SessionStore, metrics: Arc<MetricsSink>) -> Self {
        Self {
            ledger: TaskLedger::new(store, metrics.clone()),
            metrics,
            assignments: None,
        }
    }

    /// Attach an executor shim. Assignments from orchestration cycles
    /// are handed to it best-effort.
    pub fn with_executor(mut self, assignments: mpsc::Sender<TaskAssignment>) -> Self {
        self.assignments = Some(assignments);
        self
    }

    /// Replace the ledger with a new plan.
    pub fn load_project_plan(&mut self, plan: Plan) {
        self.ledger.load_plan(plan);
        self.metrics.record_plan_loaded();
    }

    /// Run one orchestration cycle: select the next eligible task and
    /// hand it to the executor shim. Returns the selected task, or
    /// None when the plan has nothing left to assign.
    pub fn run_orchestration_cycle(&mut self) -> Option<Task> {
        let task = self.ledger.select_next()?;
        self.metrics.record_task_assigned();

        if let Some(tx) = &self.assignments {
            let assignment = TaskAssignment {
                task_id: task.id.clone(),
                description: task.description.clone(),
            };
            // Best-effort hand-off: the contract stops at "a task became
            // current and assignable". A full or closed channel must not
            // fail the cycle.
            if let Err(e) = tx.try_send(assignment) {
                warn!(task_id = %task.id, error = %e, "Failed to dispatch assignment");
            }
        }

        Some(task)
    }

    /// Ingest an executor report and apply the matching transition.
    ///
    /// Unrecognized status values are logged and ignored; they must
    /// not raise or corrupt ledger state.
    pub fn receive_report(&mut self, report: TaskReport) {
        let known = self.ledger.find(&report.task_id).is_some();
        if !known {
            self.metrics.record_report_unknown_task();
        }

        match report.status.parse::<ReportStatus>() {
            Ok(ReportStatus::Completed) => {
                if let Some(output) = &report.output {
                    debug!(task_id = %report.task_id, output = %output, "Report output");
                }
                self.ledger.apply_completion(&report.task_id);
                if known {
                    self.metrics.record_report_completed();
                }
            }
            Ok(ReportStatus::Failed) => {
                let error = report.error.as_deref().unwrap_or(UNKNOWN_ERROR);
                self.ledger.apply_failure(&report.task_id, error);
                if known {
                    self.metrics.record_report_failed();
                }
            }
            Err(_) => {
                warn!(
                    task_id = %report.task_id,
                    status = %report.status,
                    "Unrecognized report status, ignoring"
                );
                self.metrics.record_report_unrecognized();
            }
        }
    }

    /// Explicitly return a failed task to pending.
    pub fn reset_task(&mut self, task_id: &TaskId) -> bool {
        let reset = self.ledger.reset_task(task_id);
        if reset {
            self.metrics.record_task_reset();
        }
        reset
    }

    /// Current project status, computed from in-memory state.
    pub fn get_status(&self) -> StatusSnapshot {
        self.ledger.snapshot()
    }

    /// Id of the current task, if one is assigned.
    pub fn current_task_id(&self) -> Option<TaskId> {
        self.ledger.snapshot().current_task.map(|t| t.id)
    }
}

/// Consume reports from the channel and apply them to the orchestrator.
///
/// Runs until the channel closes. Each report is applied behind the
/// shared write lock, preserving the single-writer model.
pub async fn ingest_reports(
    orchestrator: Arc<tokio::sync::RwLock<Orchestrator>>,
    mut reports: mpsc::Receiver<TaskReport>,
) {
    while let Some(report) = reports.recv().await {
        info!(task_id = %report.task_id, status = %report.status, "Report received");
        orchestrator.write().await.receive_report(report);
    }
    debug!("Report channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::TaskStatus;

    fn orchestrator_in(dir: &tempfile::TempDir) -> (Orchestrator, Arc<MetricsSink>) {
        let metrics = Arc::new(MetricsSink::new());
        let store = SessionStore::new(dir.path().join("session_state.json"));
        (Orchestrator::new(store, metrics.clone()), metrics)
    }

    fn two_task_plan() -> Plan {
        Plan::from_json(
            r#"{"tasks":[{"id":"A","description":"x"},{"id":"B","description":"y"}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, _) = orchestrator_in(&dir);
        orch.load_project_plan(two_task_plan());

        let a = orch.run_orchestration_cycle().unwrap();
        assert_eq!(a.id, TaskId::new("A"));
        assert_eq!(a.status, TaskStatus::InProgress);

        orch.receive_report(TaskReport::completed("A", "done"));

        let b = orch.run_orchestration_cycle().unwrap();
        assert_eq!(b.id, TaskId::new("B"));

        orch.receive_report(TaskReport::failed("B", "boom"));
        assert!(orch.run_orchestration_cycle().is_none());

        let status = orch.get_status();
        assert_eq!(status.completed_tasks.len(), 1);
        assert_eq!(status.completed_tasks[0].id, TaskId::new("A"));
        let b = status
            .project_tasks
            .iter()
            .find(|t| t.id == TaskId::new("B"))
            .unwrap();
        assert_eq!(b.status, TaskStatus::Failed);
        assert_eq!(b.error.as_deref(), Some("boom"));
        assert!(status.current_task.is_none());
    }

    #[test]
    fn test_failure_without_error_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, _) = orchestrator_in(&dir);
        orch.load_project_plan(two_task_plan());
        orch.run_orchestration_cycle();

        orch.receive_report(TaskReport {
            task_id: TaskId::new("A"),
            status: "failed".to_owned(),
            output: None,
            error: None,
        });

        let status = orch.get_status();
        let a = status
            .project_tasks
            .iter()
            .find(|t| t.id == TaskId::new("A"))
            .unwrap();
        assert_eq!(a.error.as_deref(), Some("Unknown error"));
    }

    #[test]
    fn test_unrecognized_status_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, metrics) = orchestrator_in(&dir);
        orch.load_project_plan(two_task_plan());
        let a = orch.run_orchestration_cycle().unwrap();

        orch.receive_report(TaskReport {
            task_id: a.id.clone(),
            status: "exploded".to_owned(),
            output: None,
            error: None,
        });

        let status = orch.get_status();
        let task = status.project_tasks.iter().find(|t| t.id == a.id).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(metrics.render().contains("outcome=\"unrecognized\"} 1"));
    }

    #[test]
    fn test_metrics_counters_move() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, metrics) = orchestrator_in(&dir);
        orch.load_project_plan(two_task_plan());
        orch.run_orchestration_cycle();
        orch.receive_report(TaskReport::failed("A", "boom"));
        orch.reset_task(&TaskId::new("A"));

        let output = metrics.render();
        assert!(output.contains("overseer_plans_loaded_total 1"));
        assert!(output.contains("overseer_tasks_assigned_total 1"));
        assert!(output.contains("outcome=\"failed\"} 1"));
        assert!(output.contains("overseer_tasks_reset_total 1"));
    }

    #[tokio::test]
    async fn test_cycle_dispatches_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = Arc::new(MetricsSink::new());
        let store = SessionStore::new(dir.path().join("session_state.json"));
        let (tx, mut rx) = crate::executor::assignment_channel();
        let mut orch = Orchestrator::new(store, metrics).with_executor(tx);

        orch.load_project_plan(two_task_plan());
        orch.run_orchestration_cycle();

        let assignment = rx.recv().await.unwrap();
        assert_eq!(assignment.task_id, TaskId::new("A"));
    }

    #[tokio::test]
    async fn test_ingest_reports_applies_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, _) = orchestrator_in(&dir);
        orch.load_project_plan(two_task_plan());
        orch.run_orchestration_cycle();

        let shared = Arc::new(tokio::sync::RwLock::new(orch));
        let (tx, rx) = crate::executor::report_channel();
        let ingest = tokio::spawn(ingest_reports(shared.clone(), rx));

        tx.send(TaskReport::completed("A", "done")).await.unwrap();
        drop(tx);
        ingest.await.unwrap();

        let status = shared.read().await.get_status();
        assert_eq!(status.completed_tasks.len(), 1);
    }
}
