use crate::vidsort_core::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Undo log file, written into the source root after each Organize batch.
pub const UNDO_FILE_NAME: &str = ".vidsort-undo.json";

/// One completed move, as executed (after any on-disk disambiguation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Ordered log of the most recent batch's successful moves. Single level:
/// a new batch replaces the previous record irrecoverably.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub moves: Vec<ExecutedMove>,
}

impl UndoRecord {
    pub fn new() -> Self {
        UndoRecord {
            timestamp: OffsetDateTime::now_utc(),
            moves: Vec::new(),
        }
    }

    /// Record a completed move. Only ever called after the filesystem
    /// operation succeeded.
    pub fn push(&mut self, source: PathBuf, destination: PathBuf) {
        self.moves.push(ExecutedMove {
            source,
            destination,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }
}

impl Default for UndoRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Persistence for the undo record, so `undo` works across invocations.
#[derive(Debug, Clone)]
pub struct UndoStore {
    path: PathBuf,
}

impl UndoStore {
    pub fn new(source_root: &Path) -> Self {
        UndoStore {
            path: source_root.join(UNDO_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the persisted record, if any.
    pub fn load(&self) -> Result<Option<UndoRecord>> {
        if !self.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        let record: UndoRecord = serde_json::from_str(&data)?;
        Ok(Some(record))
    }

    /// Persist a record, replacing whatever batch came before.
    pub fn save(&self, record: &UndoRecord) -> Result<()> {
        let data = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, data)?;
        log::debug!("Wrote undo record ({} moves) to {}", record.len(), self.path.display());
        Ok(())
    }

    /// Remove the persisted record. Missing file is fine.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
