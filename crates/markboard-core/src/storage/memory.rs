//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::session::GradingRecord;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, GradingRecord>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, record: &GradingRecord) -> StorageResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
        records.insert(id.to_string(), record.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<GradingRecord> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
        records.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
        Ok(records.keys().cloned().collect())
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let records = self
            .records
            .read()
            .map_err(|e| StorageError::Other(format!("lock error: {}", e)))?;
        Ok(records.contains_key(id))
    }
}
