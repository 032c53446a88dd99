//! Durable storage for evidence images.
//!
//! The upload pipeline talks to this trait only; a failed write is fatal to
//! the submission that carried the image (no partial evidence sets).

mod fs;

pub use fs::FsObjectStore;

use crate::config::EvidenceStoreConfig;
use async_trait::async_trait;
use thiserror::Error;

/// Object storage error
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("failed to store object '{key}': {message}")]
    Write { key: String, message: String },
}

/// Trait for evidence object stores
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist one object under `key` and return its stable reference URL.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, ObjectStoreError>;
}

/// Create an object store from configuration
pub fn create_object_store(config: &EvidenceStoreConfig) -> Box<dyn ObjectStore> {
    match config {
        EvidenceStoreConfig::Filesystem { root, base_url } => {
            Box::new(FsObjectStore::new(root.clone(), base_url.clone()))
        }
    }
}
