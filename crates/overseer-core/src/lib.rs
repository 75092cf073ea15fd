//! Overseer Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Filesystem
//! - Runtime specifics
//!
//! All types here represent the core business domain of Overseer.

pub mod error;
pub mod ids;
pub mod plan;
pub mod report;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use error::CoreError;
pub use ids::TaskId;
pub use plan::{Plan, PlanTask};
pub use report::TaskReport;
pub use status::{ReportStatus, TaskStatus};
pub use task::Task;
