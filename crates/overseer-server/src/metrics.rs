//! Metrics collection and Prometheus text formatting.
//!
//! The sink is explicitly constructed and injected into the
//! orchestrator rather than living behind a process-wide global.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for orchestration activity.
#[derive(Debug, Default)]
pub struct MetricsSink {
    plans_loaded: AtomicU64,
    tasks_assigned: AtomicU64,
    reports_completed: AtomicU64,
    reports_failed: AtomicU64,
    reports_unrecognized: AtomicU64,
    reports_unknown_task: AtomicU64,
    tasks_reset: AtomicU64,
    session_save_failures: AtomicU64,
}

impl MetricsSink {
    /// Create a fresh sink with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_plan_loaded(&self) {
        self.plans_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_assigned(&self) {
        self.tasks_assigned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_completed(&self) {
        self.reports_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_failed(&self) {
        self.reports_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_unrecognized(&self) {
        self.reports_unrecognized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_unknown_task(&self) {
        self.reports_unknown_task.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_reset(&self) {
        self.tasks_reset.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_save_failure(&self) {
        self.session_save_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Format all counters as Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut output = String::new();

        writeln!(
            output,
            "# HELP overseer_plans_loaded_total Number of project plans loaded"
        )
        .ok();
        writeln!(output, "# TYPE overseer_plans_loaded_total counter").ok();
        writeln!(
            output,
            "overseer_plans_loaded_total {}",
            self.plans_loaded.load(Ordering::Relaxed)
        )
        .ok();

        writeln!(output).ok();
        writeln!(
            output,
            "# HELP overseer_tasks_assigned_total Number of task assignments handed out"
        )
        .ok();
        writeln!(output, "# TYPE overseer_tasks_assigned_total counter").ok();
        writeln!(
            output,
            "overseer_tasks_assigned_total {}",
            self.tasks_assigned.load(Ordering::Relaxed)
        )
        .ok();

        writeln!(output).ok();
        writeln!(
            output,
            "# HELP overseer_reports_total Executor reports received by outcome"
        )
        .ok();
        writeln!(output, "# TYPE overseer_reports_total counter").ok();
        writeln!(
            output,
            "overseer_reports_total{{outcome=\"completed\"}} {}",
            self.reports_completed.load(Ordering::Relaxed)
        )
        .ok();
        writeln!(
            output,
            "overseer_reports_total{{outcome=\"failed\"}} {}",
            self.reports_failed.load(Ordering::Relaxed)
        )
        .ok();
        writeln!(
            output,
            "overseer_reports_total{{outcome=\"unrecognized\"}} {}",
            self.reports_unrecognized.load(Ordering::Relaxed)
        )
        .ok();
        writeln!(
            output,
            "overseer_reports_total{{outcome=\"unknown_task\"}} {}",
            self.reports_unknown_task.load(Ordering::Relaxed)
        )
        .ok();

        writeln!(output).ok();
        writeln!(
            output,
            "# HELP overseer_tasks_reset_total Failed tasks explicitly reset to pending"
        )
        .ok();
        writeln!(output, "# TYPE overseer_tasks_reset_total counter").ok();
        writeln!(
            output,
            "overseer_tasks_reset_total {}",
            self.tasks_reset.load(Ordering::Relaxed)
        )
        .ok();

        writeln!(output).ok();
        writeln!(
            output,
            "# HELP overseer_session_save_failures_total Session document writes that failed"
        )
        .ok();
        writeln!(output, "# TYPE overseer_session_save_failures_total counter").ok();
        writeln!(
            output,
            "overseer_session_save_failures_total {}",
            self.session_save_failures.load(Ordering::Relaxed)
        )
        .ok();

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fresh_sink() {
        let sink = MetricsSink::new();
        let output = sink.render();

        assert!(output.contains("overseer_plans_loaded_total 0"));
        assert!(output.contains("overseer_tasks_assigned_total 0"));
        assert!(output.contains("overseer_reports_total{outcome=\"completed\"} 0"));
        assert!(output.contains("overseer_reports_total{outcome=\"unknown_task\"} 0"));
        assert!(output.contains("overseer_tasks_reset_total 0"));
        assert!(output.contains("overseer_session_save_failures_total 0"));
    }

    #[test]
    fn test_counters_move() {
        let sink = MetricsSink::new();
        sink.record_plan_loaded();
        sink.record_task_assigned();
        sink.record_task_assigned();
        sink.record_report_failed();

        let output = sink.render();
        assert!(output.contains("overseer_plans_loaded_total 1"));
        assert!(output.contains("overseer_tasks_assigned_total 2"));
        assert!(output.contains("overseer_reports_total{outcome=\"failed\"} 1"));
    }
}
