//! The data store the pipeline writes through.
//!
//! Uniqueness of slugs and the existence of a referenced category are checked
//! here, inside a single write, and never re-checked by callers.

use std::future::Future;

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    article::{Article, ArticleFields},
    category::{Category, CategoryFields},
    contact::ContactEntry,
};

mod database;
mod memory;

pub use database::Database;
pub use memory::MemoryStore;

/// Which articles a read may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Published articles only. Used by every reader-facing path.
    Public,
    /// Drafts included. Used by the authoring surface.
    Everything,
}

impl Visibility {
    #[must_use]
    pub const fn admits(self, article: &Article) -> bool {
        match self {
            Self::Public => article.published(),
            Self::Everything => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} slug `{slug}` is already taken")]
    SlugTaken { entity: &'static str, slug: String },
    #[error("category {0} does not exist")]
    MissingCategory(Uuid),
    #[error("category {0} is still used by articles")]
    CategoryInUse(Uuid),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("database error: {0}")]
    Database(#[from] redb::Error),
    #[error("cannot encode record: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// `true` for rejections caused by uniqueness or referential rules.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::SlugTaken { .. } | Self::MissingCategory(_) | Self::CategoryInUse(_)
        )
    }

    const fn article_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "article",
            id,
        }
    }

    const fn category_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "category",
            id,
        }
    }
}

/// Article row before the store assigns its identity.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub fields: ArticleFields,
    pub author_id: String,
}

impl NewArticle {
    fn stamp(self) -> Article {
        let now = OffsetDateTime::now_utc();
        Article::new(Uuid::new_v4(), self.fields, self.author_id, now, now)
    }
}

fn stamp_category(fields: CategoryFields) -> Category {
    Category::new(Uuid::new_v4(), fields, OffsetDateTime::now_utc())
}

/// Newest first. Ties keep their incoming order.
fn sort_articles(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

fn sort_categories(categories: &mut [Category]) {
    categories.sort_by(|a, b| a.name().cmp(b.name()));
}

fn sort_contacts(entries: &mut [ContactEntry]) {
    entries.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}

/// Persistent storage for articles, categories and contact entries.
///
/// Every write is atomic for its row and the indexes it touches; there is no
/// version check, so the last successful update wins.
pub trait DataStore: Send + Sync {
    /// Articles admitted by `visibility`, newest first.
    fn list_articles(
        &self,
        visibility: Visibility,
    ) -> impl Future<Output = Result<Vec<Article>, StoreError>> + Send;

    fn article(&self, id: Uuid) -> impl Future<Output = Result<Option<Article>, StoreError>> + Send;

    fn article_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> impl Future<Output = Result<Option<Article>, StoreError>> + Send;

    /// Insert a new article.
    ///
    /// Rejects a taken slug or a missing category.
    fn insert_article(
        &self,
        article: NewArticle,
    ) -> impl Future<Output = Result<Article, StoreError>> + Send;

    /// Replace the editable fields of an existing article.
    fn update_article(
        &self,
        id: Uuid,
        fields: ArticleFields,
    ) -> impl Future<Output = Result<Article, StoreError>> + Send;

    fn delete_article(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All categories ordered by name.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, StoreError>> + Send;

    fn category(&self, id: Uuid)
    -> impl Future<Output = Result<Option<Category>, StoreError>> + Send;

    fn category_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Category>, StoreError>> + Send;

    fn insert_category(
        &self,
        fields: CategoryFields,
    ) -> impl Future<Output = Result<Category, StoreError>> + Send;

    fn update_category(
        &self,
        id: Uuid,
        fields: CategoryFields,
    ) -> impl Future<Output = Result<Category, StoreError>> + Send;

    /// Delete a category no article refers to.
    fn delete_category(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn insert_contact(
        &self,
        entry: ContactEntry,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Contact entries, newest first.
    fn list_contacts(&self) -> impl Future<Output = Result<Vec<ContactEntry>, StoreError>> + Send;
}
