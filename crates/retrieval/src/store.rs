//! On-disk vector store.
//!
//! Each corpus persists to `<store>/index.json`: the embedding model name and
//! every chunk with its vector. Rebuilding an index replaces the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use supportdesk_core::error::RetrievalError;
use tracing::debug;

const INDEX_FILE: &str = "index.json";

/// One embedded chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Document the chunk was cut from
    pub source: PathBuf,
    /// Position of the chunk within its document
    pub chunk_index: usize,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// The persisted contents of one named store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStore {
    /// Embedding model the vectors were produced with
    pub model: String,
    pub chunks: Vec<StoredChunk>,
}

impl IndexStore {
    pub fn new(model: impl Into<String>, chunks: Vec<StoredChunk>) -> Self {
        Self {
            model: model.into(),
            chunks,
        }
    }

    /// Path of the index file inside a store directory.
    pub fn file_path(store_dir: &Path) -> PathBuf {
        store_dir.join(INDEX_FILE)
    }

    /// Load a store, or `None` if it has never been written.
    pub fn load(store_dir: &Path) -> Result<Option<Self>, RetrievalError> {
        let path = Self::file_path(store_dir);
        if !path.exists() {
            return Ok(None);
        }

        let data = std::fs::read_to_string(&path)
            .map_err(|e| RetrievalError::Store(format!("{}: {e}", path.display())))?;
        let store: IndexStore = serde_json::from_str(&data)
            .map_err(|e| RetrievalError::Store(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), chunks = store.chunks.len(), "Loaded index store");
        Ok(Some(store))
    }

    /// Write the store, creating the directory if needed.
    pub fn save(&self, store_dir: &Path) -> Result<(), RetrievalError> {
        std::fs::create_dir_all(store_dir)
            .map_err(|e| RetrievalError::Store(format!("{}: {e}", store_dir.display())))?;

        let path = Self::file_path(store_dir);
        let data = serde_json::to_string(self).map_err(|e| RetrievalError::Store(e.to_string()))?;
        std::fs::write(&path, data)
            .map_err(|e| RetrievalError::Store(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), chunks = self.chunks.len(), "Saved index store");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
