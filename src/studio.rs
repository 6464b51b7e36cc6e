//! The authoring surface: every write an author can make.
//!
//! A submission runs validation, then the session check, then the image
//! upload, then the store write. Each step can stop the submission; an image
//! uploaded before a failed write is left where it is.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    article::{Article, ArticleDraft, ArticleFields},
    category::{Category, CategoryDraft, CategoryFields},
    contact::ContactEntry,
    error::{Error, Result},
    image::{ImagePipeline, StagedImage},
    publish::{PublishState, Transition},
    session::{Session, User},
    storage::ObjectStorage,
    store::{DataStore, NewArticle, Visibility},
};

#[derive(Debug)]
pub struct Studio<D, S, A> {
    store: Arc<D>,
    images: ImagePipeline<S>,
    session: A,
}

impl<D, S, A> Studio<D, S, A>
where
    D: DataStore,
    S: ObjectStorage,
    A: Session,
{
    pub const fn new(store: Arc<D>, images: ImagePipeline<S>, session: A) -> Self {
        Self {
            store,
            images,
            session,
        }
    }

    #[must_use]
    pub const fn images(&self) -> &ImagePipeline<S> {
        &self.images
    }

    /// The signed-in admin, or [`Error::Unauthorized`].
    ///
    /// # Errors
    /// Fails when nobody is signed in or the user is not an admin.
    pub fn author(&self) -> Result<User> {
        let user = self.session.current_user().ok_or(Error::Unauthorized)?;
        if !self.session.is_admin(&user) {
            warn!("{} attempted to author without admin rights", user.id());
            return Err(Error::Unauthorized);
        }
        Ok(user)
    }

    /// Validate, authorize and upload, returning the fields to write.
    async fn prepare(&self, draft: &ArticleDraft, image: Option<StagedImage>) -> Result<(User, ArticleFields)> {
        let fields = ArticleFields::from_draft(draft)?;
        let user = self.author()?;
        let url = self
            .images
            .resolve_image_url(image, draft.featured_image())
            .await?;
        Ok((user, fields.with_featured_image(url)))
    }

    /// Create an article stamped with the current author.
    ///
    /// # Errors
    /// Any of [`Error::Validation`], [`Error::Unauthorized`], [`Error::Upload`]
    /// or [`Error::WriteConflict`], checked in that order.
    pub async fn create_article(
        &self,
        draft: ArticleDraft,
        image: Option<StagedImage>,
    ) -> Result<Article> {
        let (user, fields) = self.prepare(&draft, image).await?;
        let article = self
            .store
            .insert_article(NewArticle {
                fields,
                author_id: user.id().to_string(),
            })
            .await
            .map_err(Error::write)?;
        info!(
            "Created article `{}` ({})",
            article.slug(),
            article.state()
        );
        Ok(article)
    }

    /// Replace every editable field of an article, publish flag included.
    ///
    /// # Errors
    /// Same as [`Studio::create_article`], plus [`Error::NotFound`] for an
    /// unknown id.
    pub async fn update_article(
        &self,
        id: Uuid,
        draft: ArticleDraft,
        image: Option<StagedImage>,
    ) -> Result<Article> {
        let (_, fields) = self.prepare(&draft, image).await?;
        let before = self
            .store
            .article(id)
            .await
            .map_err(Error::read)?
            .map(|article| article.state());
        let article = self
            .store
            .update_article(id, fields)
            .await
            .map_err(Error::write)?;

        match before.unwrap_or_default().transition_to(article.state()) {
            Transition::Publish => info!("Published `{}`", article.slug()),
            Transition::Unpublish => info!("Moved `{}` back to drafts", article.slug()),
            Transition::Unchanged => info!("Updated article `{}`", article.slug()),
        }
        Ok(article)
    }

    /// Flip the publish flag through the regular update path.
    ///
    /// # Errors
    /// See [`Studio::update_article`].
    pub async fn set_published(&self, id: Uuid, state: PublishState) -> Result<Article> {
        let article = self
            .store
            .article(id)
            .await
            .map_err(Error::read)?
            .ok_or(Error::NotFound)?;
        let draft = ArticleDraft::from(&article).with_published(state.is_published());
        self.update_article(id, draft, None).await
    }

    /// Remove an article whatever its state. Its image stays in storage.
    ///
    /// # Errors
    /// [`Error::Unauthorized`], [`Error::NotFound`] or [`Error::WriteConflict`].
    pub async fn delete_article(&self, id: Uuid) -> Result<()> {
        self.author()?;
        self.store.delete_article(id).await.map_err(Error::write)?;
        info!("Deleted article {id}");
        Ok(())
    }

    /// Every article, drafts included, newest first.
    ///
    /// # Errors
    /// [`Error::Unauthorized`] or [`Error::Store`].
    pub async fn articles(&self) -> Result<Vec<Article>> {
        self.author()?;
        self.store
            .list_articles(Visibility::Everything)
            .await
            .map_err(Error::read)
    }

    /// Find an article by id or slug, drafts included. A key that parses as
    /// an id but matches none is tried as a slug.
    ///
    /// # Errors
    /// [`Error::Unauthorized`], [`Error::NotFound`] or [`Error::Store`].
    pub async fn find_article(&self, key: &str) -> Result<Article> {
        self.author()?;
        if let Ok(id) = Uuid::parse_str(key) {
            if let Some(article) = self.store.article(id).await.map_err(Error::read)? {
                return Ok(article);
            }
        }
        self.store
            .article_by_slug(key, Visibility::Everything)
            .await
            .map_err(Error::read)?
            .ok_or(Error::NotFound)
    }

    /// # Errors
    /// [`Error::Validation`], [`Error::Unauthorized`] or [`Error::WriteConflict`].
    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category> {
        let fields = CategoryFields::from_draft(&draft)?;
        self.author()?;
        let category = self
            .store
            .insert_category(fields)
            .await
            .map_err(Error::write)?;
        info!("Created category `{}`", category.slug());
        Ok(category)
    }

    /// # Errors
    /// [`Error::Validation`], [`Error::Unauthorized`], [`Error::NotFound`] or
    /// [`Error::WriteConflict`].
    pub async fn update_category(&self, id: Uuid, draft: CategoryDraft) -> Result<Category> {
        let fields = CategoryFields::from_draft(&draft)?;
        self.author()?;
        let category = self
            .store
            .update_category(id, fields)
            .await
            .map_err(Error::write)?;
        info!("Updated category `{}`", category.slug());
        Ok(category)
    }

    /// Delete a category. Refused while any article still files under it.
    ///
    /// # Errors
    /// [`Error::Unauthorized`], [`Error::NotFound`] or [`Error::WriteConflict`].
    pub async fn delete_category(&self, id: Uuid) -> Result<()> {
        self.author()?;
        self.store.delete_category(id).await.map_err(Error::write)?;
        info!("Deleted category {id}");
        Ok(())
    }

    /// Find a category by id or slug.
    ///
    /// # Errors
    /// [`Error::NotFound`] or [`Error::Store`].
    pub async fn find_category(&self, key: &str) -> Result<Category> {
        if let Ok(id) = Uuid::parse_str(key) {
            if let Some(category) = self.store.category(id).await.map_err(Error::read)? {
                return Ok(category);
            }
        }
        self.store
            .category_by_slug(key)
            .await
            .map_err(Error::read)?
            .ok_or(Error::NotFound)
    }

    /// # Errors
    /// [`Error::Store`].
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.store.list_categories().await.map_err(Error::read)
    }

    /// Contact messages, newest first.
    ///
    /// # Errors
    /// [`Error::Unauthorized`] or [`Error::Store`].
    pub async fn contacts(&self) -> Result<Vec<ContactEntry>> {
        self.author()?;
        self.store.list_contacts().await.map_err(Error::read)
    }
}
