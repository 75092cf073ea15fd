//! Server configuration.

use std::path::PathBuf;

/// Orchestration server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address.
    pub bind_addr: String,

    /// Path of the session state file.
    pub session_file: PathBuf,

    /// Run the in-process stub executor that auto-completes
    /// assignments. Off by default; real executors report over HTTP.
    pub local_executor: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8044".to_string(),
            session_file: PathBuf::from("session_state.json"),
            local_executor: false,
        }
    }
}
