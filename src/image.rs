//! Cover image selection and upload.
//!
//! A file is checked when it is selected, long before any upload. Uploading
//! happens only when a write is submitted, and always before the record is
//! written, so a record never points at an image that failed to upload.
//! Replaced or cleared images stay in storage.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::Rng;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::storage::{ObjectStorage, StorageError};

/// Largest accepted upload: 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Bucket used when the manifest does not name one.
pub const DEFAULT_BUCKET: &str = "article-images";

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 11;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Image must be less than 5MB")]
    TooLarge { size: usize },
    #[error("Only JPEG, PNG, WEBP, and GIF images are allowed")]
    UnsupportedType(String),
    #[error("Image upload failed: {0}")]
    Storage(#[from] StorageError),
}

/// A file the author picked, before any checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    mime: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Load a file from disk, guessing its MIME type from the extension.
    ///
    /// # Errors
    /// Returns the IO error if the file cannot be read.
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(name, mime, bytes))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Text after the last `.` of the file name, or the whole name if there is none.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or_default()
    }
}

/// A file that passed the size and type checks and waits for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage(ImageFile);

impl StagedImage {
    #[must_use]
    pub const fn file(&self) -> &ImageFile {
        &self.0
    }

    /// A `data:` URI the author can preview before anything is uploaded.
    #[must_use]
    pub fn preview(&self) -> String {
        format!("data:{};base64,{}", self.0.mime, STANDARD.encode(&self.0.bytes))
    }
}

/// Check a selected file and stage it.
///
/// Size is checked before type.
///
/// # Errors
/// Returns [`UploadError::TooLarge`] or [`UploadError::UnsupportedType`].
pub fn select_image(file: ImageFile) -> Result<StagedImage, UploadError> {
    if file.size() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge { size: file.size() });
    }
    if !ALLOWED_MIME_TYPES.contains(&file.mime()) {
        return Err(UploadError::UnsupportedType(file.mime().to_string()));
    }
    Ok(StagedImage(file))
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| char::from(TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}

/// Storage key for an upload: `<random-token>-<unix-millis>.<extension>`.
#[must_use]
pub fn storage_key(file: &ImageFile, now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("{}-{millis}.{}", random_token(), file.extension())
}

/// Uploads staged images into one bucket of an [`ObjectStorage`].
#[derive(Debug)]
pub struct ImagePipeline<S> {
    storage: S,
    bucket: String,
}

impl<S: ObjectStorage> ImagePipeline<S> {
    pub fn new(storage: S, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Decide the image URL a write will store.
    ///
    /// Without a staged file, `existing` comes back untouched (empty meaning
    /// no image), which makes replacing the image opt-in for every edit.
    /// Pasted URLs are never checked.
    ///
    /// # Errors
    /// Returns [`UploadError::Storage`] if the upload fails.
    pub async fn resolve_image_url(
        &self,
        staged: Option<StagedImage>,
        existing: &str,
    ) -> Result<String, UploadError> {
        let Some(StagedImage(file)) = staged else {
            return Ok(existing.to_string());
        };

        let key = storage_key(&file, OffsetDateTime::now_utc());
        debug!("Uploading {} ({} bytes) as {key}", file.name, file.size());
        self.storage.upload(&self.bucket, &key, file.bytes).await?;
        Ok(self.storage.public_url(&self.bucket, &key))
    }
}
