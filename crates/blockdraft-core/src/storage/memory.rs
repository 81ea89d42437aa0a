//! In-memory storage.

use super::{Storage, StorageError, StorageResult};
use crate::persist::DesignFile;
use std::collections::HashMap;
use std::sync::RwLock;

/// Keeps designs in a map. Used by tests and scratch sessions.
#[derive(Default)]
pub struct MemoryStorage {
    designs: RwLock<HashMap<String, DesignFile>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, name: &str, design: &DesignFile) -> StorageResult<()> {
        let mut designs = self.designs.write().map_err(lock_error)?;
        designs.insert(name.to_string(), design.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> StorageResult<DesignFile> {
        let designs = self.designs.read().map_err(lock_error)?;
        designs
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn delete(&self, name: &str) -> StorageResult<()> {
        let mut designs = self.designs.write().map_err(lock_error)?;
        designs.remove(name);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let designs = self.designs.read().map_err(lock_error)?;
        let mut names: Vec<String> = designs.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        let designs = self.designs.read().map_err(lock_error)?;
        Ok(designs.contains_key(name))
    }
}
