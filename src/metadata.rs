//! Blog manifest stored in `Quill.toml` at the root of a workspace.

use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use crate::{image::DEFAULT_BUCKET, utils::write};

/// Settings for the whole blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogManifest {
    title: String,
    #[serde(default)]
    description: String,
    owner: String,
    /// Base URL uploaded images are served from.
    public_url: Url,
    #[serde(default = "default_bucket")]
    image_bucket: String,
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

impl BlogManifest {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        owner: impl Into<String>,
        public_url: Url,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            owner: owner.into(),
            public_url,
            image_bucket: default_bucket(),
        }
    }

    #[must_use]
    pub const fn title(&self) -> &str {
        self.title.as_str()
    }

    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// The only user allowed to author.
    #[must_use]
    pub const fn owner(&self) -> &str {
        self.owner.as_str()
    }

    pub fn set_owner(&mut self, owner: impl Into<String>) {
        self.owner = owner.into();
    }

    #[must_use]
    pub const fn public_url(&self) -> &Url {
        &self.public_url
    }

    #[must_use]
    pub const fn image_bucket(&self) -> &str {
        self.image_bucket.as_str()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FailToOpenManifest {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// TOML persistence shared by manifest types.
pub trait MetadataExt: Serialize + DeserializeOwned {
    /// Read and parse the file at `path`.
    ///
    /// # Errors
    /// Returns [`FailToOpenManifest`] if the file cannot be read or parsed.
    fn open(
        path: impl AsRef<Path>,
    ) -> impl Future<Output = Result<Self, FailToOpenManifest>> + Send {
        let path = path.as_ref().to_path_buf();
        async move {
            let content = tokio::fs::read_to_string(&path).await?;
            Ok(toml::from_str(&content)?)
        }
    }

    #[must_use]
    fn to_toml(&self) -> String {
        toml::to_string_pretty(self).expect("Failed to serialize metadata to TOML")
    }

    /// Write the TOML form of `self` to `path`.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if the file cannot be written.
    fn save_to_file(
        &self,
        path: impl AsRef<Path>,
    ) -> impl Future<Output = Result<(), std::io::Error>> + Send {
        let path = path.as_ref().to_path_buf();
        let toml_str = self.to_toml();
        async move { write(path, toml_str.as_bytes()).await }
    }
}

impl MetadataExt for BlogManifest {}
