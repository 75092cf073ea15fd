//! Core domain errors.

use thiserror::Error;

/// Core domain errors for Overseer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Plan input was malformed or missing required fields.
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// Report carried a status value this core does not understand.
    #[error("Unrecognized report status: {0}")]
    UnrecognizedStatus(String),
}
