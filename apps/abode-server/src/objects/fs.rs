//! Filesystem object store.

use super::{ObjectStore, ObjectStoreError};
use async_trait::async_trait;
use std::path::PathBuf;

/// Stores evidence under a server-local root directory; reference URLs are
/// formed against a configured public base URL.
pub struct FsObjectStore {
    root: PathBuf,
    base_url: String,
}

impl FsObjectStore {
    pub fn new(root: PathBuf, base_url: String) -> Self {
        Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, ObjectStoreError> {
        let path = self.root.join(key);
        let write_err = |e: std::io::Error| ObjectStoreError::Write {
            key: key.to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        tokio::fs::write(&path, bytes).await.map_err(write_err)?;

        Ok(format!("{}/{}", self.base_url, key))
    }
}
