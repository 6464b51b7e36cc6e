//! Slug identity shared by articles and categories.
//!
//! A slug is the only key used on public read paths. It is supplied by the
//! author, checked against [`SLUG_PATTERN`] by the validation ruleset, and kept
//! unique by the data store at write time.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use slug::slugify;

/// Pattern every accepted slug must match.
pub const SLUG_PATTERN: &str = "^[a-z0-9-]+$";

static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SLUG_PATTERN).expect("slug pattern is a valid regex"));

/// Returns `true` if `value` is made only of lowercase ASCII letters, digits and hyphens.
#[must_use]
pub fn is_valid_slug(value: &str) -> bool {
    SLUG_REGEX.is_match(value)
}

/// Suggest a slug for the given title.
///
/// Never applied automatically: the author decides whether to use it.
#[must_use]
pub fn suggest_slug(title: &str) -> String {
    slugify(title)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidSlug {
    #[error("slug is empty")]
    Empty,
    #[error("slug `{0}` must be lowercase letters, numbers, and hyphens only")]
    Format(String),
}

/// A slug that matched [`SLUG_PATTERN`] when it was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Slug {
    type Err = InvalidSlug;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(InvalidSlug::Empty);
        }
        if !is_valid_slug(trimmed) {
            return Err(InvalidSlug::Format(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for Slug {
    type Error = InvalidSlug;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl PartialEq<str> for Slug {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Slug {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_digits_and_hyphens() {
        assert!(is_valid_slug("my-post-1"));
        assert!(is_valid_slug("2024"));
        assert!(is_valid_slug("-"));
    }

    #[test]
    fn rejects_anything_else() {
        assert!(!is_valid_slug("My Post!"));
        assert!(!is_valid_slug("my_post"));
        assert!(!is_valid_slug("café"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn parse_trims_before_checking() {
        let slug: Slug = "  hello-world ".parse().unwrap();
        assert_eq!(slug, "hello-world");
        assert_eq!("   ".parse::<Slug>(), Err(InvalidSlug::Empty));
        assert!(matches!(
            "Hello".parse::<Slug>(),
            Err(InvalidSlug::Format(_))
        ));
    }

    #[test]
    fn suggestion_is_a_valid_slug() {
        let suggested = suggest_slug("Why I Quit My Job!");
        assert_eq!(suggested, "why-i-quit-my-job");
        assert!(is_valid_slug(&suggested));
    }
}
