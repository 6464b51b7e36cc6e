use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    publish::PublishState,
    render::{Block, render},
    slug::Slug,
    validate::{Field, ValidationError, parse_category_id, validate_article},
};

/// A stored article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    id: Uuid,
    fields: ArticleFields,
    author_id: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Article {
    /// Assemble a record. Only data stores should need this.
    #[must_use]
    pub const fn new(
        id: Uuid,
        fields: ArticleFields,
        author_id: String,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            fields,
            author_id,
            created_at,
            updated_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn fields(&self) -> &ArticleFields {
        &self.fields
    }

    #[must_use]
    pub const fn title(&self) -> &str {
        self.fields.title.as_str()
    }

    #[must_use]
    pub const fn slug(&self) -> &Slug {
        &self.fields.slug
    }

    #[must_use]
    pub const fn content(&self) -> &str {
        self.fields.content.as_str()
    }

    #[must_use]
    pub const fn excerpt(&self) -> &str {
        self.fields.excerpt.as_str()
    }

    #[must_use]
    pub fn featured_image(&self) -> Option<&str> {
        self.fields.featured_image.as_deref()
    }

    #[must_use]
    pub const fn category_id(&self) -> Option<Uuid> {
        self.fields.category_id
    }

    #[must_use]
    pub const fn published(&self) -> bool {
        self.fields.published
    }

    #[must_use]
    pub const fn state(&self) -> PublishState {
        PublishState::from_flag(self.fields.published)
    }

    #[must_use]
    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// Render the body into display blocks.
    #[must_use]
    pub fn blocks(&self) -> Vec<Block> {
        render(self.content())
    }

    /// Replace every editable field, keeping identity and authorship.
    #[must_use]
    pub fn with_fields(self, fields: ArticleFields, updated_at: OffsetDateTime) -> Self {
        Self {
            fields,
            updated_at,
            ..self
        }
    }
}

/// Editable article fields once a draft has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFields {
    pub title: String,
    pub slug: Slug,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub published: bool,
}

impl ArticleFields {
    /// Validate a draft and convert it into storable fields.
    ///
    /// The slug is stored trimmed; every other text field is kept as submitted.
    ///
    /// # Errors
    /// Returns the first rule the draft violates.
    pub fn from_draft(draft: &ArticleDraft) -> Result<Self, ValidationError> {
        validate_article(draft)?;
        let slug = draft
            .slug()
            .parse()
            .map_err(|_| ValidationError::new(Field::Slug, "Slug is required"))?;
        Ok(Self {
            title: draft.title().to_string(),
            slug,
            content: draft.content().to_string(),
            excerpt: draft.excerpt().to_string(),
            featured_image: image_field(draft.featured_image()),
            category_id: parse_category_id(draft.category_id())?,
            published: draft.published(),
        })
    }

    /// Swap in the URL the image pipeline resolved. Empty means no image.
    #[must_use]
    pub fn with_featured_image(self, url: impl Into<String>) -> Self {
        Self {
            featured_image: image_field(&url.into()),
            ..self
        }
    }
}

fn image_field(url: &str) -> Option<String> {
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}

/// Author-side article form.
///
/// Each `with_*` call consumes the draft and returns a new one, so an edit
/// always replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDraft {
    title: String,
    slug: String,
    content: String,
    excerpt: String,
    featured_image: String,
    category_id: Option<String>,
    published: bool,
}

impl ArticleDraft {
    /// An empty draft in the `Draft` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_slug(self, slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_content(self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_excerpt(self, excerpt: impl Into<String>) -> Self {
        Self {
            excerpt: excerpt.into(),
            ..self
        }
    }

    /// Link an image by URL instead of uploading one.
    #[must_use]
    pub fn with_featured_image(self, url: impl Into<String>) -> Self {
        Self {
            featured_image: url.into(),
            ..self
        }
    }

    /// Drop the current image. The stored blob is left in place.
    #[must_use]
    pub fn without_image(self) -> Self {
        Self {
            featured_image: String::new(),
            ..self
        }
    }

    #[must_use]
    pub fn with_category(self, category_id: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id.into()),
            ..self
        }
    }

    #[must_use]
    pub fn uncategorized(self) -> Self {
        Self {
            category_id: None,
            ..self
        }
    }

    #[must_use]
    pub fn with_published(self, published: bool) -> Self {
        Self { published, ..self }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    #[must_use]
    pub fn featured_image(&self) -> &str {
        &self.featured_image
    }

    #[must_use]
    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    #[must_use]
    pub const fn published(&self) -> bool {
        self.published
    }
}

impl From<&Article> for ArticleDraft {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title().to_string(),
            slug: article.slug().to_string(),
            content: article.content().to_string(),
            excerpt: article.excerpt().to_string(),
            featured_image: article.featured_image().unwrap_or_default().to_string(),
            category_id: article.category_id().map(|id| id.to_string()),
            published: article.published(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ArticleDraft {
        ArticleDraft::new()
            .with_title("Hello")
            .with_slug(" hello ")
            .with_content("body")
    }

    #[test]
    fn new_draft_is_unpublished() {
        assert!(!ArticleDraft::new().published());
    }

    #[test]
    fn fields_trim_slug_and_normalize_image() {
        let fields = ArticleFields::from_draft(&draft().with_featured_image("  ")).unwrap();
        assert_eq!(fields.slug, "hello");
        assert_eq!(fields.featured_image, None);
        assert_eq!(fields.category_id, None);

        let fields = fields.with_featured_image("https://cdn.example.com/a.png");
        assert_eq!(
            fields.featured_image.as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }

    #[test]
    fn draft_round_trips_through_article() {
        let category = Uuid::new_v4();
        let fields = ArticleFields::from_draft(
            &draft()
                .with_category(category.to_string())
                .with_featured_image("https://cdn.example.com/a.png")
                .with_published(true),
        )
        .unwrap();
        let now = OffsetDateTime::now_utc();
        let article = Article::new(Uuid::new_v4(), fields.clone(), "me".into(), now, now);

        let rebuilt = ArticleFields::from_draft(&ArticleDraft::from(&article)).unwrap();
        assert_eq!(rebuilt, fields);
    }

    #[test]
    fn clearing_the_image_empties_the_field() {
        let draft = draft()
            .with_featured_image("https://cdn.example.com/a.png")
            .without_image();
        assert_eq!(draft.featured_image(), "");
    }
}
