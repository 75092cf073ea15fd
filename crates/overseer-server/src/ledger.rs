//! Task ledger - ordered task list with lifecycle state machine.
//!
//! ```text
//! pending ──assign──> in_progress ──complete──> completed (terminal)
//!                          │
//!                          └──fail──> failed (terminal, explicit reset only)
//! ```
//!
//! The ledger is the source of truth for task status. Every mutation
//! is synchronized to the session store before returning.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use overseer_core::{Plan, Task, TaskId, TaskStatus};

use crate::metrics::MetricsSink;
use crate::session::{SessionDocument, SessionStore};

/// Pure-read view of orchestration progress.
///
/// `pending_tasks` is the broad "not completed" bucket: it includes
/// failed and in-progress tasks, not just strictly pending ones.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub current_task: Option<Task>,
    pub project_tasks: Vec<Task>,
    pub overall_status: String,
    pub completed_tasks: Vec<Task>,
    pub pending_tasks: Vec<Task>,
}

/// The ordered collection of all tasks for the current plan.
pub struct TaskLedger {
    tasks: Vec<Task>,
    current: Option<TaskId>,
    store: SessionStore,
    metrics: Arc<MetricsSink>,
}

impl TaskLedger {
    /// Build a ledger on top of a session store, restoring any state
    /// the store's backing file holds from a previous run.
    pub fn new(mut store: SessionStore, metrics: Arc<MetricsSink>) -> Self {
        let doc = store.load();
        let tasks = doc.project_tasks.clone();
        let current = doc.current_task.as_ref().map(|t| t.id.clone());
        Self {
            tasks,
            current,
            store,
            metrics,
        }
    }

    /// Replace the entire ledger with the given plan and persist.
    ///
    /// The current-task pointer is left alone; the next selection call
    /// overwrites or clears it. There are no merge semantics with a
    /// previously loaded plan.
    pub fn load_plan(&mut self, plan: Plan) {
        self.tasks = plan.into_tasks();
        info!(tasks = self.tasks.len(), "Project plan loaded");
        self.persist();
    }

    /// Select the first eligible task in list order, mark it as the
    /// current assignment, and persist.
    ///
    /// Completed and failed tasks are skipped; an in-progress task is
    /// re-returned so that repeated cycles without an intervening
    /// report stay idempotent. Returns None (and clears the current
    /// pointer) when nothing is eligible.
    pub fn select_next(&mut self) -> Option<Task> {
        let position = self.tasks.iter().position(|t| t.status.is_selectable());

        match position {
            Some(idx) => {
                self.tasks[idx].mark_in_progress();
                let task = self.tasks[idx].clone();
                self.current = Some(task.id.clone());
                info!(task_id = %task.id, "Assigned task");
                self.persist();
                Some(task)
            }
            None => {
                self.current = None;
                info!("No more tasks to assign");
                self.persist();
                None
            }
        }
    }

    /// Mark a task completed and persist.
    ///
    /// An unknown id is tolerated with a warning: reports may race with
    /// plan reloads. A completed task must not remain current, so the
    /// current pointer is cleared when it referenced this task.
    pub fn apply_completion(&mut self, task_id: &TaskId) {
        match self.tasks.iter_mut().find(|t| &t.id == task_id) {
            Some(task) => {
                task.mark_completed();
                info!(task_id = %task_id, "Task completed");
                if self.current.as_ref() == Some(task_id) {
                    self.current = None;
                }
            }
            None => {
                warn!(task_id = %task_id, "Completion report for unknown task, ignoring");
            }
        }
        self.persist();
    }

    /// Mark a task failed with the given error message and persist.
    ///
    /// The task keeps its error until externally reset; it may remain
    /// current until the next selection call replaces or clears it.
    pub fn apply_failure(&mut self, task_id: &TaskId, error: &str) {
        match self.tasks.iter_mut().find(|t| &t.id == task_id) {
            Some(task) => {
                task.mark_failed(error);
                info!(task_id = %task_id, error = %error, "Task failed");
            }
            None => {
                warn!(task_id = %task_id, "Failure report for unknown task, ignoring");
            }
        }
        self.persist();
    }

    /// Return a failed task to pending, making it selectable again.
    ///
    /// Failed tasks are never re-selected automatically; this explicit
    /// operation is the only path back into the rotation. Returns false
    /// (without touching the ledger) for unknown ids or tasks that are
    /// not failed.
    pub fn reset_task(&mut self, task_id: &TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| &t.id == task_id) {
            Some(task) if task.status == TaskStatus::Failed => {
                task.reset();
                info!(task_id = %task_id, "Task reset to pending");
                self.persist();
                true
            }
            Some(task) => {
                warn!(
                    task_id = %task_id,
                    status = %task.status,
                    "Reset rejected, task is not failed"
                );
                false
            }
            None => {
                warn!(task_id = %task_id, "Reset requested for unknown task, ignoring");
                false
            }
        }
    }

    /// Compute a status snapshot from in-memory state. No I/O.
    pub fn snapshot(&self) -> StatusSnapshot {
        let current_task = self
            .current
            .as_ref()
            .and_then(|id| self.tasks.iter().find(|t| &t.id == id))
            .cloned();

        StatusSnapshot {
            current_task,
            project_tasks: self.tasks.clone(),
            overall_status: self.store.get().overall_status.clone(),
            completed_tasks: self
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .cloned()
                .collect(),
            pending_tasks: self
                .tasks
                .iter()
                .filter(|t| t.status != TaskStatus::Completed)
                .cloned()
                .collect(),
        }
    }

    /// Look up a task by id.
    pub fn find(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == task_id)
    }

    /// Number of tasks in the ledger.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no plan is loaded.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Rewrite the whole session document from in-memory state.
    ///
    /// Durability is best-effort; a failed write is already logged by
    /// the store, so it is only counted here.
    fn persist(&mut self) {
        let current_task = self
            .current
            .as_ref()
            .and_then(|id| self.tasks.iter().find(|t| &t.id == id))
            .cloned();
        let document = SessionDocument {
            current_task,
            project_tasks: self.tasks.clone(),
            overall_status: self.store.get().overall_status.clone(),
        };
        if !self.store.save(document) {
            self.metrics.record_session_save_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_in(dir: &tempfile::TempDir) -> TaskLedger {
        TaskLedger::new(
            SessionStore::new(dir.path().join("session_state.json")),
            Arc::new(MetricsSink::new()),
        )
    }

    fn plan(entries: &[(&str, &str)]) -> Plan {
        let tasks = entries
            .iter()
            .map(|(id, desc)| format!(r#"{{"id":"{}","description":"{}"}}"#, id, desc))
            .collect::<Vec<_>>()
            .join(",");
        Plan::from_json(&format!(r#"{{"tasks":[{}]}}"#, tasks)).unwrap()
    }

    #[test]
    fn test_tasks_selected_once_each_in_list_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a"), ("B", "b"), ("C", "c")]));

        let mut seen = Vec::new();
        for _ in 0..3 {
            let task = ledger.select_next().unwrap();
            seen.push(task.id.clone());
            ledger.apply_completion(&task.id);
        }
        assert_eq!(
            seen,
            vec![TaskId::new("A"), TaskId::new("B"), TaskId::new("C")]
        );
        assert!(ledger.select_next().is_none());
    }

    #[test]
    fn test_select_next_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a"), ("B", "b")]));

        let first = ledger.select_next().unwrap();
        let overall_before = ledger.snapshot().overall_status;
        let second = ledger.select_next().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, TaskStatus::InProgress);
        assert_eq!(ledger.snapshot().overall_status, overall_before);
        assert_eq!(
            ledger.snapshot().current_task.map(|t| t.id),
            Some(TaskId::new("A"))
        );
    }

    #[test]
    fn test_selection_marks_in_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a")]));

        let task = ledger.select_next().unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(
            ledger.find(&TaskId::new("A")).unwrap().status,
            TaskStatus::InProgress
        );
    }

    #[test]
    fn test_unknown_task_report_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a")]));
        ledger.select_next();

        let before = ledger.snapshot();
        ledger.apply_completion(&TaskId::new("ghost"));
        ledger.apply_failure(&TaskId::new("ghost"), "boom");
        let after = ledger.snapshot();

        assert_eq!(before.project_tasks, after.project_tasks);
        assert_eq!(
            before.current_task.map(|t| t.id),
            after.current_task.map(|t| t.id)
        );
    }

    #[test]
    fn test_failed_tasks_are_not_reselected() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a"), ("B", "b")]));

        let task = ledger.select_next().unwrap();
        ledger.apply_failure(&task.id, "boom");

        let next = ledger.select_next().unwrap();
        assert_eq!(next.id, TaskId::new("B"));

        ledger.apply_completion(&next.id);
        assert!(ledger.select_next().is_none());
    }

    #[test]
    fn test_completion_clears_current_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a")]));

        let task = ledger.select_next().unwrap();
        ledger.apply_completion(&task.id);
        assert!(ledger.snapshot().current_task.is_none());
    }

    #[test]
    fn test_reset_makes_failed_task_eligible_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a")]));

        let task = ledger.select_next().unwrap();
        ledger.apply_failure(&task.id, "boom");
        assert!(ledger.select_next().is_none());

        assert!(ledger.reset_task(&TaskId::new("A")));
        let task = ledger.find(&TaskId::new("A")).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.error.is_none());

        let again = ledger.select_next().unwrap();
        assert_eq!(again.id, TaskId::new("A"));
    }

    #[test]
    fn test_reset_rejected_for_non_failed_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a")]));

        assert!(!ledger.reset_task(&TaskId::new("A"))); // pending
        ledger.select_next();
        assert!(!ledger.reset_task(&TaskId::new("A"))); // in_progress
        assert!(!ledger.reset_task(&TaskId::new("ghost"))); // unknown
    }

    #[test]
    fn test_pending_bucket_is_broad() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a"), ("B", "b"), ("C", "c")]));

        let a = ledger.select_next().unwrap();
        ledger.apply_completion(&a.id);
        let b = ledger.select_next().unwrap();
        ledger.apply_failure(&b.id, "boom");
        ledger.select_next(); // C now in_progress

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.completed_tasks.len(), 1);
        // failed and in_progress both count as "not completed"
        assert_eq!(snapshot.pending_tasks.len(), 2);
    }

    #[test]
    fn test_ledger_restored_across_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session_state.json");

        {
            let mut ledger =
                TaskLedger::new(SessionStore::new(&path), Arc::new(MetricsSink::new()));
            ledger.load_plan(plan(&[("A", "a"), ("B", "b")]));
            let task = ledger.select_next().unwrap();
            ledger.apply_completion(&task.id);
            ledger.select_next();
        }

        let restored = TaskLedger::new(SessionStore::new(&path), Arc::new(MetricsSink::new()));
        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.find(&TaskId::new("A")).unwrap().status,
            TaskStatus::Completed
        );
        assert_eq!(
            restored.snapshot().current_task.map(|t| t.id),
            Some(TaskId::new("B"))
        );
    }

    #[test]
    fn test_failed_save_counted_in_metrics() {
        let dir = tempfile::tempdir().unwrap();
        // parent directory does not exist, so every write fails
        let store = SessionStore::new(dir.path().join("missing").join("session_state.json"));
        let metrics = Arc::new(MetricsSink::new());
        let mut ledger = TaskLedger::new(store, metrics.clone());

        ledger.load_plan(plan(&[("A", "a")]));
        assert!(metrics
            .render()
            .contains("overseer_session_save_failures_total 1"));

        // the ledger itself keeps working despite the failing store
        let task = ledger.select_next().unwrap();
        assert_eq!(task.id, TaskId::new("A"));
        assert!(metrics
            .render()
            .contains("overseer_session_save_failures_total 2"));
    }

    #[test]
    fn test_load_plan_replaces_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ledger_in(&dir);
        ledger.load_plan(plan(&[("A", "a")]));
        ledger.select_next();

        ledger.load_plan(plan(&[("X", "x")]));
        assert_eq!(ledger.len(), 1);
        // old current pointer is discarded by the next selection
        let next = ledger.select_next().unwrap();
        assert_eq!(next.id, TaskId::new("X"));
    }
}
