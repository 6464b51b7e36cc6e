use thiserror::Error;

use crate::{image::UploadError, store::StoreError, validate::ValidationError};

pub type Result<T> = std::result::Result<T, Error>;

/// Why an authoring or reading operation stopped.
///
/// Every variant ends the current operation; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// A draft broke a field rule. Raised before any I/O.
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// The image was refused or could not be stored. Nothing was written.
    #[error("{0}")]
    Upload(#[from] UploadError),
    /// The store refused the write, for instance over a taken slug.
    #[error("Failed to save: {0}")]
    WriteConflict(StoreError),
    /// No visible record matched.
    #[error("Not found")]
    NotFound,
    /// There is no session user, or they may not author.
    #[error("You don't have admin permissions")]
    Unauthorized,
    /// A read failed inside the store.
    #[error("Failed to load: {0}")]
    Store(StoreError),
}

impl Error {
    pub(crate) fn write(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound,
            other => Self::WriteConflict(other),
        }
    }

    pub(crate) fn read(err: StoreError) -> Self {
        Self::Store(err)
    }
}
