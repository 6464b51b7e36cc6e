//! Blob storage for uploaded images.

use std::{
    collections::HashMap,
    future::Future,
    path::{Component, Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

use crate::utils::write;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object key `{0}`")]
    InvalidKey(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage rejected the upload: {0}")]
    Rejected(String),
}

/// Where uploaded blobs live and how readers reach them.
pub trait ObjectStorage: Send + Sync {
    fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Reject keys that could escape the bucket directory.
fn check_key(key: &str) -> Result<(), StorageError> {
    let path = Path::new(key);
    let plain = !key.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if plain {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Blobs written under a local directory and served from a base URL.
///
/// ```text
/// <root>/<bucket>/<key>   ->   <base_url>/<bucket>/<key>
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    base_url: Url,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: Url) -> Self {
        Self {
            root: root.into(),
            base_url,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

impl ObjectStorage for FsStorage {
    async fn upload(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        check_key(bucket)?;
        check_key(key)?;
        write(self.object_path(bucket, key), &bytes).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(bucket).push(key);
        }
        url.to_string()
    }
}

/// In-memory storage that records every upload.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    attempts: AtomicUsize,
    fail_with: Option<String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose every upload fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Number of upload calls made, failed ones included.
    pub fn upload_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl ObjectStorage for MemoryStorage {
    async fn upload(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.fail_with {
            return Err(StorageError::Rejected(reason.clone()));
        }
        check_key(key)?;
        self.objects
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()), bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("memory://{bucket}/{key}")
    }
}
