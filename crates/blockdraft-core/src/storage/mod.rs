//! Where design files live.

mod file;
mod memory;

pub use file::{FileStorage, load_from_path, save_to_path};
pub use memory::MemoryStorage;

use crate::persist::DesignFile;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Design not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A named collection of designs.
pub trait Storage: Send + Sync {
    /// Save a design under `name`, replacing any previous one.
    fn save(&self, name: &str, design: &DesignFile) -> StorageResult<()>;

    fn load(&self, name: &str) -> StorageResult<DesignFile>;

    /// Delete a design. Deleting a missing design is not an error.
    fn delete(&self, name: &str) -> StorageResult<()>;

    /// Names of all stored designs.
    fn list(&self) -> StorageResult<Vec<String>>;

    fn exists(&self, name: &str) -> StorageResult<bool>;
}
