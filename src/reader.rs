//! Reader-facing paths. Only published articles are ever returned here.

use std::sync::Arc;

use tracing::debug;

use crate::{
    article::Article,
    category::Category,
    contact::{ContactDraft, ContactEntry},
    error::{Error, Result},
    index::{CategoryIndex, UNCATEGORIZED},
    render::{Block, render, render_html},
    store::{DataStore, Visibility},
    utils::display_date,
};

/// A published article with its category resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleView {
    article: Article,
    category: Option<Category>,
}

impl ArticleView {
    #[must_use]
    pub const fn article(&self) -> &Article {
        &self.article
    }

    #[must_use]
    pub const fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category.as_ref().map_or(UNCATEGORIZED, Category::name)
    }

    #[must_use]
    pub fn date(&self) -> String {
        display_date(self.article.created_at())
    }

    #[must_use]
    pub fn blocks(&self) -> Vec<Block> {
        render(self.article.content())
    }

    #[must_use]
    pub fn html(&self) -> String {
        render_html(self.article.content())
    }
}

#[derive(Debug)]
pub struct Reader<D> {
    store: Arc<D>,
}

impl<D: DataStore> Reader<D> {
    pub const fn new(store: Arc<D>) -> Self {
        Self { store }
    }

    /// Look up a published article by slug.
    ///
    /// # Errors
    /// [`Error::NotFound`] if no published article has this slug, including
    /// when a draft does.
    pub async fn article(&self, slug: &str) -> Result<ArticleView> {
        let article = self
            .store
            .article_by_slug(slug, Visibility::Public)
            .await
            .map_err(Error::read)?
            .ok_or(Error::NotFound)?;
        let category = match article.category_id() {
            Some(id) => self.store.category(id).await.map_err(Error::read)?,
            None => None,
        };
        debug!("Serving article `{slug}`");
        Ok(ArticleView { article, category })
    }

    /// Load categories and published articles for the blog listing.
    ///
    /// # Errors
    /// [`Error::Store`] if either load fails.
    pub async fn index(&self) -> Result<CategoryIndex> {
        let (categories, articles) = futures::try_join!(
            self.store.list_categories(),
            self.store.list_articles(Visibility::Public)
        )
        .map_err(Error::read)?;
        Ok(CategoryIndex::new(categories, articles))
    }

    /// Categories are always visible.
    ///
    /// # Errors
    /// [`Error::NotFound`] or [`Error::Store`].
    pub async fn category(&self, slug: &str) -> Result<Category> {
        self.store
            .category_by_slug(slug)
            .await
            .map_err(Error::read)?
            .ok_or(Error::NotFound)
    }

    /// Leave a message for the author.
    ///
    /// # Errors
    /// [`Error::Validation`] or [`Error::WriteConflict`].
    pub async fn send_contact(&self, draft: &ContactDraft) -> Result<ContactEntry> {
        let entry = ContactEntry::from_draft(draft)?;
        self.store
            .insert_contact(entry.clone())
            .await
            .map_err(Error::write)?;
        debug!("Stored contact message {}", entry.id());
        Ok(entry)
    }
}
