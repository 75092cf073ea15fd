//! Session store - durable snapshot of orchestration state.
//!
//! The store is a passive persistence surface: it never validates or
//! mutates the document it is given. Every save rewrites the whole
//! document; task lists are small and writes happen once per lifecycle
//! transition, so O(n) rewrites are acceptable and avoid partial-write
//! inconsistency.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use overseer_core::Task;

/// Default value for `overall_status`.
fn default_overall_status() -> String {
    "not_started".to_owned()
}

/// The persisted orchestration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    /// The task currently selected for execution, if any.
    #[serde(default)]
    pub current_task: Option<Task>,

    /// The full task ledger at the time of the last save.
    #[serde(default)]
    pub project_tasks: Vec<Task>,

    /// Coarse project status; the core never mutates this, it exists
    /// for external writers of the session document.
    #[serde(default = "default_overall_status")]
    pub overall_status: String,
}

impl Default for SessionDocument {
    fn default() -> Self {
        Self {
            current_task: None,
            project_tasks: Vec::new(),
            overall_status: default_overall_status(),
        }
    }
}

/// Internal store errors. These never escape [`SessionStore`]'s public
/// API: persistence is fail-open, losing session state is recoverable
/// from a plan re-load while crashing the process is not.
#[derive(Debug, Error)]
enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed session document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// File-backed session store.
pub struct SessionStore {
    path: PathBuf,
    document: SessionDocument,
}

impl SessionStore {
    /// Create a store backed by the given file path. No I/O happens
    /// until [`load`](Self::load) or [`save`](Self::save) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: SessionDocument::default(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document from disk.
    ///
    /// A missing file starts an empty session; an unreadable or
    /// malformed file is logged and treated the same way.
    pub fn load(&mut self) -> &SessionDocument {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No session file, starting with empty state");
            self.document = SessionDocument::default();
            return &self.document;
        }

        match self.try_load() {
            Ok(doc) => {
                info!(
                    path = %self.path.display(),
                    tasks = doc.project_tasks.len(),
                    "Session state loaded"
                );
                self.document = doc;
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to load session state, starting with empty state"
                );
                self.document = SessionDocument::default();
            }
        }
        &self.document
    }

    fn try_load(&self) -> Result<SessionDocument, SessionError> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replace the in-memory document and write it out.
    ///
    /// The write goes to a sibling temp file which is then renamed over
    /// the target, so a concurrent reader never observes a half-written
    /// document. I/O failure is logged and swallowed; callers must
    /// treat persistence as best-effort.
    pub fn save(&mut self, document: SessionDocument) -> bool {
        self.document = document;
        match self.try_save() {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session state saved");
                true
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to save session state"
                );
                false
            }
        }
    }

    fn try_save(&self) -> Result<(), SessionError> {
        let raw = serde_json::to_string_pretty(&self.document)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// The last loaded/saved in-memory document, without touching disk.
    pub fn get(&self) -> &SessionDocument {
        &self.document
    }
}
