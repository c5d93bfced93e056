//! Auto-save functionality for grading records.
//!
//! Provides automatic periodic saving so an interrupted grading session
//! loses at most one interval of work.

use crate::session::GradingRecord;
use crate::storage::{Storage, StorageResult};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Key for the most recently saved record, used for session restore.
pub const LAST_RECORD_KEY: &str = "__last_record__";

/// Manages automatic grading record persistence.
pub struct AutoSaveManager<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    /// Auto-save interval.
    interval: Duration,
    /// Last save timestamp.
    last_save: Option<Instant>,
    /// Whether the session has unsaved changes.
    dirty: bool,
    /// False once the host has torn the grading surface down.
    enabled: bool,
    /// Current document ID being graded.
    current_doc_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
            enabled: true,
            current_doc_id: None,
        }
    }

    /// Set the auto-save interval.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Get the auto-save interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the session as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if the session has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Enable or disable automatic saving. Disabled on host teardown;
    /// an in-flight save is not affected.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether automatic saving is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the current document ID.
    pub fn set_document_id(&mut self, id: Option<String>) {
        self.current_doc_id = id;
    }

    /// Get the current document ID.
    pub fn document_id(&self) -> Option<&str> {
        self.current_doc_id.as_deref()
    }

    /// Check if enough time has passed for an auto-save.
    pub fn should_save(&self) -> bool {
        if !self.enabled || !self.dirty {
            return false;
        }

        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true, // Never saved, should save
        }
    }

    /// Save the record if needed (dirty + interval elapsed).
    /// Returns true if a save was performed.
    pub fn maybe_save(&mut self, record: &GradingRecord) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }

        self.save(record)?;
        Ok(true)
    }

    /// Force save the record immediately.
    pub fn save(&mut self, record: &GradingRecord) -> StorageResult<()> {
        let doc_id = self
            .current_doc_id
            .clone()
            .unwrap_or_else(|| record.document_id.clone());

        self.storage.save(&doc_id, record)?;

        // Also save as the "last record" for session restore
        self.storage.save(LAST_RECORD_KEY, record)?;

        self.last_save = Some(Instant::now());
        self.dirty = false;

        Ok(())
    }

    /// Load a record by document ID.
    pub fn load(&mut self, id: &str) -> StorageResult<GradingRecord> {
        let record = self.storage.load(id)?;
        self.current_doc_id = Some(id.to_string());
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(record)
    }

    /// Try to load the most recently saved record.
    /// Returns None if no record was ever saved.
    pub fn load_last(&mut self) -> Option<GradingRecord> {
        match self.storage.load(LAST_RECORD_KEY) {
            Ok(record) => {
                self.current_doc_id = Some(record.document_id.clone());
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(record)
            }
            Err(_) => None,
        }
    }

    /// Delete a record by document ID.
    pub fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id)
    }

    /// List all saved document IDs.
    pub fn list_records(&self) -> StorageResult<Vec<String>> {
        let mut ids = self.storage.list()?;
        // Filter out the special "last record" key
        ids.retain(|id| id != LAST_RECORD_KEY);
        Ok(ids)
    }

    /// Check if a record exists.
    pub fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id)
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}
