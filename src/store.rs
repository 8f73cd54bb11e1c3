//! JSON persistence of contract state.
//!
//! Writes go to a temporary file in the target directory which is then renamed
//! over the state file, so readers see either the old or the new document and
//! never a torn one. There is no locking: when two processes write the same file
//! concurrently, the last rename wins.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::definition::ContractDefinition;
use crate::errors::{FillError, FillResult};
use crate::registry::Registry;
use crate::state::{ContractState, PersistedState};

/// A state file on disk.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and validate the state, resolving its contract type through `registry`.
    pub fn load<'r>(
        &self,
        registry: &'r Registry,
    ) -> FillResult<(&'r ContractDefinition, ContractState)> {
        let bytes = fs::read(&self.path).map_err(|source| self.io_error(source))?;
        let persisted: PersistedState = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "unreadable state file");
            FillError::CorruptState {
                reason: format!("{}: {}", self.path.display(), e),
            }
        })?;

        let def = registry
            .get(&persisted.contract)
            .ok_or_else(|| FillError::CorruptState {
                reason: format!(
                    "{}: unknown contract type `{}`",
                    self.path.display(),
                    persisted.contract
                ),
            })?;
        let state = ContractState::from_persisted(def, persisted).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "state failed validation");
            e
        })?;
        Ok((def, state))
    }

    /// Atomically replace the file with `state`.
    pub fn persist(&self, def: &ContractDefinition, state: &ContractState) -> FillResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| self.io_error(source))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|source| self.io_error(source))?;
        serde_json::to_writer_pretty(&mut tmp, &state.to_persisted(def))
            .map_err(|e| self.io_error(io::Error::from(e)))?;
        tmp.write_all(b"\n")
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        info!(
            path = %self.path.display(),
            contract = state.contract(),
            revision = state.revision(),
            "persisted state"
        );
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> FillError {
        FillError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
