//! Filesystem-backed message store.
//!
//! Raw inbound messages live as files under one directory, optionally
//! namespaced by a key prefix, keyed by message id.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::pipeline::types::MessageStore;

/// `MessageStore` over a local directory.
pub struct FsMessageStore {
    dir: PathBuf,
    key_prefix: String,
}

impl FsMessageStore {
    pub fn new(dir: impl Into<PathBuf>, key_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key_prefix: key_prefix.into(),
        }
    }

    /// Build from environment variables.
    /// Returns `None` if `REMAIL_STORE_DIR` is not set.
    pub fn from_env() -> Option<Self> {
        let dir = std::env::var("REMAIL_STORE_DIR").ok()?;
        let key_prefix = std::env::var("REMAIL_STORE_PREFIX").unwrap_or_default();
        Some(Self::new(dir, key_prefix))
    }

    fn path_for(&self, message_id: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.key_prefix, message_id))
    }
}

#[async_trait]
impl MessageStore for FsMessageStore {
    async fn fetch(&self, message_id: &str) -> Result<String, StoreError> {
        let path = self.path_for(message_id);
        debug!(message_id, path = %path.display(), "Fetching stored message");
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    message_id: message_id.to_string(),
                }
            } else {
                StoreError::Io {
                    message_id: message_id.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn delete(&self, message_id: &str) -> Result<(), StoreError> {
        let path = self.path_for(message_id);
        info!(message_id, path = %path.display(), "Deleting stored message");
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| StoreError::Io {
                message_id: message_id.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_reads_prefixed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("inbox-msg-1"), b"From: a@b.com\r\n\r\nhi").unwrap();

        let store = FsMessageStore::new(dir.path(), "inbox-");
        let raw = store.fetch("msg-1").await.unwrap();
        assert_eq!(raw, "From: a@b.com\r\n\r\nhi");
    }

    #[tokio::test]
    async fn fetch_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMessageStore::new(dir.path(), "");
        let err = store.fetch("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msg-1");
        std::fs::write(&path, b"x").unwrap();

        let store = FsMessageStore::new(dir.path(), "");
        store.delete("msg-1").await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn delete_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMessageStore::new(dir.path(), "");
        let err = store.delete("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn fetch_decodes_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("msg-1"), [b'h', b'i', 0xff]).unwrap();

        let store = FsMessageStore::new(dir.path(), "");
        let raw = store.fetch("msg-1").await.unwrap();
        assert!(raw.starts_with("hi"));
    }
}
