//! Field rules checked before any write.
//!
//! Every check is pure: nothing here touches the store or mutates a draft.
//! Rules run in field-declaration order and stop at the first violation, so a
//! caller only ever sees one message at a time.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use uuid::Uuid;

use crate::{
    article::ArticleDraft, category::CategoryDraft, contact::ContactDraft, slug::is_valid_slug,
};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_ARTICLE_SLUG_LEN: usize = 200;
pub const MAX_CONTENT_LEN: usize = 50_000;
pub const MAX_EXCERPT_LEN: usize = 500;
pub const MAX_CATEGORY_NAME_LEN: usize = 100;
pub const MAX_CATEGORY_SLUG_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_CONTACT_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_MESSAGE_LEN: usize = 10;
pub const MAX_MESSAGE_LEN: usize = 5_000;

const HYPHENATED_UUID_LEN: usize = 36;

const SLUG_FORMAT: &str = "Slug must be lowercase letters, numbers, and hyphens only";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// The field a [`ValidationError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Slug,
    Content,
    Excerpt,
    CategoryId,
    Name,
    Description,
    Email,
    Message,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Slug => "slug",
            Self::Content => "content",
            Self::Excerpt => "excerpt",
            Self::CategoryId => "category",
            Self::Name => "name",
            Self::Description => "description",
            Self::Email => "email",
            Self::Message => "message",
        })
    }
}

/// First rule a draft violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    field: Field,
    message: &'static str,
}

impl ValidationError {
    #[must_use]
    pub const fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }

    #[must_use]
    pub const fn field(&self) -> Field {
        self.field
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

type Rule = Result<(), ValidationError>;

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn required(value: &str, max: usize, field: Field, missing: &'static str, too_long: &'static str) -> Rule {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, missing));
    }
    at_most(trimmed, max, field, too_long)
}

fn at_most(value: &str, max: usize, field: Field, too_long: &'static str) -> Rule {
    if char_len(value) > max {
        return Err(ValidationError::new(field, too_long));
    }
    Ok(())
}

fn slug(value: &str, max: usize, too_long: &'static str) -> Rule {
    required(value, max, Field::Slug, "Slug is required", too_long)?;
    if !is_valid_slug(value.trim()) {
        return Err(ValidationError::new(Field::Slug, SLUG_FORMAT));
    }
    Ok(())
}

/// Parse a raw category reference from a form field.
///
/// Blank input means "uncategorized". Only the hyphenated form is accepted.
///
/// # Errors
/// Returns a [`Field::CategoryId`] error when the input is not a UUID.
pub fn parse_category_id(raw: Option<&str>) -> Result<Option<Uuid>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) if raw.len() == HYPHENATED_UUID_LEN => Uuid::try_parse(raw)
            .map(Some)
            .map_err(|_| invalid_category()),
        Some(_) => Err(invalid_category()),
    }
}

fn invalid_category() -> ValidationError {
    ValidationError::new(Field::CategoryId, "Invalid category")
}

/// Check an article draft.
///
/// `published` needs no rule: the draft only holds a `bool`.
///
/// # Errors
/// Returns the first violated rule, in field order.
pub fn validate_article(draft: &ArticleDraft) -> Rule {
    required(
        draft.title(),
        MAX_TITLE_LEN,
        Field::Title,
        "Title is required",
        "Title too long",
    )?;
    slug(draft.slug(), MAX_ARTICLE_SLUG_LEN, "Slug too long")?;
    required(
        draft.content(),
        MAX_CONTENT_LEN,
        Field::Content,
        "Content is required",
        "Content too long",
    )?;
    at_most(
        draft.excerpt(),
        MAX_EXCERPT_LEN,
        Field::Excerpt,
        "Excerpt too long",
    )?;
    parse_category_id(draft.category_id())?;
    Ok(())
}

/// Check a category draft.
///
/// # Errors
/// Returns the first violated rule, in field order.
pub fn validate_category(draft: &CategoryDraft) -> Rule {
    required(
        draft.name(),
        MAX_CATEGORY_NAME_LEN,
        Field::Name,
        "Name is required",
        "Name must be less than 100 characters",
    )?;
    slug(
        draft.slug(),
        MAX_CATEGORY_SLUG_LEN,
        "Slug must be less than 100 characters",
    )?;
    at_most(
        draft.description(),
        MAX_DESCRIPTION_LEN,
        Field::Description,
        "Description must be less than 500 characters",
    )
}

/// Check a contact message.
///
/// # Errors
/// Returns the first violated rule, in field order.
pub fn validate_contact(draft: &ContactDraft) -> Rule {
    required(
        draft.name(),
        MAX_CONTACT_NAME_LEN,
        Field::Name,
        "Name is required",
        "Name must be less than 100 characters",
    )?;

    let email = draft.email().trim();
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::new(Field::Email, "Invalid email address"));
    }
    at_most(
        email,
        MAX_EMAIL_LEN,
        Field::Email,
        "Email must be less than 255 characters",
    )?;

    let message = draft.message().trim();
    if char_len(message) < MIN_MESSAGE_LEN {
        return Err(ValidationError::new(
            Field::Message,
            "Message must be at least 10 characters",
        ));
    }
    at_most(
        message,
        MAX_MESSAGE_LEN,
        Field::Message,
        "Message must be less than 5000 characters",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> ArticleDraft {
        ArticleDraft::new()
            .with_title("Hello")
            .with_slug("my-post-1")
            .with_content("# Hello\n\nbody")
    }

    fn first_error(draft: &ArticleDraft) -> (Field, &'static str) {
        let err = validate_article(draft).unwrap_err();
        (err.field(), err.message())
    }

    #[test]
    fn valid_article_passes() {
        assert_eq!(validate_article(&article()), Ok(()));
    }

    #[test]
    fn slug_format_is_enforced() {
        let draft = article().with_slug("My Post!");
        assert_eq!(first_error(&draft), (Field::Slug, SLUG_FORMAT));
    }

    #[test]
    fn slug_is_checked_after_trimming() {
        assert_eq!(validate_article(&article().with_slug("  my-post-1 ")), Ok(()));
        assert_eq!(
            first_error(&article().with_slug("   ")),
            (Field::Slug, "Slug is required")
        );
    }

    #[test]
    fn first_violation_wins() {
        let draft = ArticleDraft::new().with_slug("BAD SLUG");
        assert_eq!(first_error(&draft), (Field::Title, "Title is required"));

        let draft = article().with_content("").with_excerpt("x".repeat(501));
        assert_eq!(first_error(&draft), (Field::Content, "Content is required"));
    }

    #[test]
    fn limits_are_inclusive() {
        assert_eq!(validate_article(&article().with_title("t".repeat(200))), Ok(()));
        assert_eq!(
            first_error(&article().with_title("t".repeat(201))),
            (Field::Title, "Title too long")
        );
        assert_eq!(
            first_error(&article().with_content("c".repeat(50_001))),
            (Field::Content, "Content too long")
        );
        assert_eq!(
            first_error(&article().with_excerpt("e".repeat(501))),
            (Field::Excerpt, "Excerpt too long")
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        assert_eq!(validate_article(&article().with_title("é".repeat(200))), Ok(()));
    }

    #[test]
    fn category_reference_must_be_a_uuid() {
        assert_eq!(
            first_error(&article().with_category("money")),
            (Field::CategoryId, "Invalid category")
        );
        let id = Uuid::new_v4().to_string();
        assert_eq!(validate_article(&article().with_category(id)), Ok(()));
        assert_eq!(validate_article(&article().with_category("  ")), Ok(()));
    }

    #[test]
    fn category_reference_must_be_hyphenated() {
        let id = Uuid::new_v4();
        for raw in [
            id.simple().to_string(),
            id.braced().to_string(),
            id.urn().to_string(),
        ] {
            assert_eq!(
                first_error(&article().with_category(raw)),
                (Field::CategoryId, "Invalid category")
            );
        }
        assert_eq!(
            parse_category_id(Some(&id.hyphenated().to_string())),
            Ok(Some(id))
        );
    }

    #[test]
    fn category_rules() {
        let draft = CategoryDraft::new().with_name("Money").with_slug("money");
        assert_eq!(validate_category(&draft), Ok(()));

        let err = validate_category(&draft.clone().with_name(" ")).unwrap_err();
        assert_eq!(err.message(), "Name is required");

        let err = validate_category(&draft.clone().with_slug("m".repeat(101))).unwrap_err();
        assert_eq!(err.message(), "Slug must be less than 100 characters");

        let err = validate_category(&draft.with_description("d".repeat(501))).unwrap_err();
        assert_eq!(err.field(), Field::Description);
    }

    #[test]
    fn contact_rules() {
        let draft = ContactDraft::new("Ada", "ada@example.com", "Hello there, friend");
        assert_eq!(validate_contact(&draft), Ok(()));

        let err = validate_contact(&ContactDraft::new("Ada", "not-an-email", "Hello there, friend"))
            .unwrap_err();
        assert_eq!(err.message(), "Invalid email address");

        let err =
            validate_contact(&ContactDraft::new("Ada", "ada@example.com", "  short  ")).unwrap_err();
        assert_eq!(err.message(), "Message must be at least 10 characters");
    }
}
