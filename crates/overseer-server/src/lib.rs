//! Overseer orchestration server.
//!
//! Coordinates execution of an ordered task plan: the orchestrator
//! selects the next eligible task, hands it to an executor shim, and
//! ingests terminal reports. Ledger and current-task state are
//! persisted to a JSON session document on every mutation.

pub mod config;
pub mod executor;
pub mod guard;
pub mod http;
pub mod ledger;
pub mod metrics;
pub mod orchestrator;
pub mod session;

pub use config::Config;
pub use orchestrator::Orchestrator;
