use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidsortError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Filesystem errors
    #[error("Directory walker error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Destination already exists: {0}")]
    Conflict(PathBuf),

    // Batch errors
    #[error("No scan to organize: run a scan first")]
    NotScanned,

    #[error("No undo record found at {0}")]
    NoUndoRecord(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// A single per-item failure inside a batch. Batches never abort on these;
/// they are collected and reported after the remaining items have run.
#[derive(Debug)]
pub struct ItemFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub error: VidsortError,
}

/// Per-item failures accumulated over one batch.
#[derive(Debug, Default)]
pub struct ItemFailures {
    pub failures: Vec<ItemFailure>,
}

impl std::fmt::Display for ItemFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for failure in &self.failures {
            writeln!(
                f,
                "  {} -> {}: {}",
                failure.source.display(),
                failure.destination.display(),
                failure.error
            )?;
        }
        Ok(())
    }
}

impl ItemFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: PathBuf, destination: PathBuf, error: VidsortError) {
        self.failures.push(ItemFailure {
            source,
            destination,
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }
}

/// Result type for vidsort operations.
pub type Result<T> = std::result::Result<T, VidsortError>;
