//! State manager
//!
//! File-based persistence of [`RunState`] with atomic writes. The run is
//! single-threaded, so the engine owns the manager mutably; nothing here
//! needs locking. State is only written at finalization — a crashed run
//! leaves the previous run's state authoritative and is safely retryable.

use super::types::RunState;
use crate::error::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Loads, caches and persists the run state
#[derive(Debug, Default)]
pub struct StateManager {
    /// Path of the state file; empty for in-memory mode
    path: PathBuf,
    state: RunState,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create a state manager over a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| Error::State {
                message: format!("Failed to read state file: {e}"),
            })?;
            parse_state(&contents)?
        } else {
            RunState::new()
        };

        Ok(Self { path, state })
    }

    /// Create a state manager from an inline JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            path: PathBuf::new(),
            state: parse_state(json)?,
        })
    }

    /// Current state
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Mutable current state
    pub fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    /// Persist the current state.
    ///
    /// Writes to a temp file first and renames it into place so a crash
    /// mid-write cannot corrupt the previous state.
    pub async fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(()); // In-memory mode
        }

        let contents = serde_json::to_string_pretty(&self.state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })?;

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to write state file: {e}"),
            })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to rename state file: {e}"),
            })?;

        Ok(())
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

/// Parse a state document, tolerating a non-mapping root.
fn parse_state(contents: &str) -> Result<RunState> {
    let value: Value = serde_json::from_str(contents).map_err(|e| Error::State {
        message: format!("Failed to parse state file: {e}"),
    })?;

    if !value.is_object() {
        warn!("State document root is not a mapping, starting from empty state");
        return Ok(RunState::new());
    }

    serde_json::from_value(value).map_err(|e| Error::State {
        message: format!("Failed to parse state file: {e}"),
    })
}
