//! Article publishing for a personal blog.
//!
//! Authors submit drafts through a [`Studio`](studio::Studio); readers see
//! published articles through a [`Reader`](reader::Reader). Both sit on a
//! [`DataStore`](store::DataStore), and featured images go to an
//! [`ObjectStorage`](storage::ObjectStorage).

pub mod article;
pub mod category;
pub mod contact;
pub mod error;
pub mod image;
pub mod index;
pub mod metadata;
pub mod publish;
pub mod reader;
pub mod render;
pub mod session;
pub mod slug;
pub mod storage;
pub mod store;
pub mod studio;
pub mod utils;
pub mod validate;
pub mod workspace;

pub use error::{Error, Result};
