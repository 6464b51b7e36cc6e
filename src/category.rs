use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    slug::Slug,
    validate::{Field, ValidationError, validate_category},
};

/// A category articles can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: Uuid,
    fields: CategoryFields,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl Category {
    #[must_use]
    pub const fn new(id: Uuid, fields: CategoryFields, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            fields,
            created_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn fields(&self) -> &CategoryFields {
        &self.fields
    }

    #[must_use]
    pub const fn name(&self) -> &str {
        self.fields.name.as_str()
    }

    #[must_use]
    pub const fn slug(&self) -> &Slug {
        &self.fields.slug
    }

    #[must_use]
    pub const fn description(&self) -> &str {
        self.fields.description.as_str()
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub fn with_fields(self, fields: CategoryFields) -> Self {
        Self { fields, ..self }
    }
}

/// Editable category fields once a draft has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFields {
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub description: String,
}

impl CategoryFields {
    /// Validate a draft and convert it into storable fields.
    ///
    /// # Errors
    /// Returns the first rule the draft violates.
    pub fn from_draft(draft: &CategoryDraft) -> Result<Self, ValidationError> {
        validate_category(draft)?;
        let slug = draft
            .slug()
            .parse()
            .map_err(|_| ValidationError::new(Field::Slug, "Slug is required"))?;
        Ok(Self {
            name: draft.name().to_string(),
            slug,
            description: draft.description().to_string(),
        })
    }
}

/// Author-side category form. Replaced wholesale on every edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    name: String,
    slug: String,
    description: String,
}

impl CategoryDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
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
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name().to_string(),
            slug: category.slug().to_string(),
            description: category.description().to_string(),
        }
    }
}
