//! Filesystem data lake operations.
//!
//! Handles reading and writing to the local data lake:
//! - The match log (normalized JSONL)
//! - Reference lists (queues, modes, maps, players, seasons)

pub mod jsonl;
pub mod source;

pub use jsonl::*;
pub use source::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn normalized_dir(&self) -> PathBuf {
        self.data_dir.join("normalized")
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.data_dir.join("reference")
    }

    /// Get the path of an entity's JSONL file.
    pub fn entity_path(&self, entity: EntityType) -> PathBuf {
        let dir = match entity {
            EntityType::Match => self.normalized_dir(),
            _ => self.reference_dir(),
        };
        dir.join(entity.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
