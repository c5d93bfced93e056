//! Storage abstraction for grading records.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS, LAST_RECORD_KEY};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::session::GradingRecord;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for grading record storage backends.
///
/// The host injects one per session; this is the crate's only I/O
/// boundary. Calls are synchronous and expected to be cheap enough for
/// the grading surface's event loop; anything slower belongs behind the
/// host's own queue.
pub trait Storage: Send + Sync {
    /// Persist a record under a document id.
    fn save(&self, id: &str, record: &GradingRecord) -> StorageResult<()>;

    /// Load the record for a document id.
    fn load(&self, id: &str) -> StorageResult<GradingRecord>;

    /// Delete a stored record.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all stored document ids.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a record exists.
    fn exists(&self, id: &str) -> StorageResult<bool>;
}
