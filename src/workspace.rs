use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;
use tokio::fs::{self as async_fs, create_dir};
use tracing::info;
use url::Url;

use crate::{
    image::ImagePipeline,
    metadata::{BlogManifest, FailToOpenManifest, MetadataExt},
    reader::Reader,
    session::{LocalSession, Session},
    storage::FsStorage,
    store::{Database, StoreError},
    studio::Studio,
};

/// structure of workspace is as follows:
/// ```text
/// /workspace-root
/// ├── Quill.toml
/// ├── .quill
/// │   └── quill.redb
/// └── public
///     └── article-images
///         ├── k3j9x0a1b2c-1717171717171.png
///         └── ...
/// ```
#[derive(Debug, Clone)]
pub struct Workspace(Arc<WorkspaceInner>);

#[derive(Debug)]
struct WorkspaceInner {
    path: PathBuf,
    manifest: BlogManifest,
    store: Arc<Database>,
}

#[derive(Debug, Error)]
pub enum FailToOpenWorkspace {
    #[error("Workspace already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("Workspace path must be absolute: {0}")]
    InvalidPath(PathBuf),
    #[error("Invalid manifest: {0}")]
    Manifest(#[from] FailToOpenManifest),
    #[error("Cannot open database: {0}")]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Workspace {
    /// Open the workspace rooted at `path`.
    ///
    /// # Errors
    /// Fails if `Quill.toml` is missing or invalid, or the database cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, FailToOpenWorkspace> {
        let path = path.as_ref();
        let manifest = BlogManifest::open(path.join("Quill.toml")).await?;
        Self::load(path, manifest).await
    }

    async fn load(path: &Path, manifest: BlogManifest) -> Result<Self, FailToOpenWorkspace> {
        let cache_dir = path.join(".quill");
        async_fs::create_dir_all(&cache_dir).await?;
        let store = Database::open(cache_dir.join("quill.redb")).await?;
        Ok(Self(Arc::new(WorkspaceInner {
            path: path.to_path_buf(),
            manifest,
            store: Arc::new(store),
        })))
    }

    /// Create a new workspace named `name` under `root`, owned by the local user.
    ///
    /// # Errors
    /// Fails if the directory already exists or cannot be written.
    pub async fn create(root: impl AsRef<Path>, name: String) -> Result<Self, FailToOpenWorkspace> {
        let root = root.as_ref().join(&name);
        if async_fs::metadata(&root).await.is_ok() {
            return Err(FailToOpenWorkspace::AlreadyExists(root));
        }
        create_dir(&root).await?;
        create_dir(root.join("public")).await?;

        let public_url = Url::from_directory_path(root.join("public"))
            .map_err(|()| FailToOpenWorkspace::InvalidPath(root.clone()))?;
        let manifest = BlogManifest::new(name, "", detect_local_user(), public_url);
        manifest.save_to_file(root.join("Quill.toml")).await?;

        let workspace = Self::load(&root, manifest).await?;
        info!("Created workspace at {}", root.display());
        Ok(workspace)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.0.path
    }

    #[must_use]
    pub fn manifest(&self) -> &BlogManifest {
        &self.0.manifest
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("Quill.toml")
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root().join("public")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root().join(".quill")
    }

    #[must_use]
    pub fn store(&self) -> Arc<Database> {
        self.0.store.clone()
    }

    pub fn storage(&self) -> FsStorage {
        FsStorage::new(self.public_dir(), self.manifest().public_url().clone())
    }

    /// The session of whoever runs this process.
    pub fn local_session(&self) -> LocalSession {
        LocalSession::new(self.manifest().owner())
    }

    pub fn studio<A: Session>(&self, session: A) -> Studio<Database, FsStorage, A> {
        let images = ImagePipeline::new(self.storage(), self.manifest().image_bucket());
        Studio::new(self.store(), images, session)
    }

    pub fn reader(&self) -> Reader<Database> {
        Reader::new(self.store())
    }
}

fn detect_local_user() -> String {
    whoami::realname()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let created = Workspace::create(dir.path(), "blog".to_string())
            .await
            .unwrap();
        assert_eq!(created.manifest().title(), "blog");
        assert_eq!(created.manifest().description(), "");
        assert!(created.manifest_path().exists());
        let manifest = created.manifest().clone();
        drop(created);

        let opened = Workspace::open(dir.path().join("blog")).await.unwrap();
        assert_eq!(opened.manifest(), &manifest);
        assert!(opened.manifest().public_url().as_str().starts_with("file://"));
    }

    #[tokio::test]
    async fn create_refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        Workspace::create(dir.path(), "blog".to_string()).await.unwrap();
        let err = Workspace::create(dir.path(), "blog".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, FailToOpenWorkspace::AlreadyExists(_)));
    }
}
