//! Draft/published lifecycle of an article.
//!
//! There is no dedicated publish action: the flag travels with every update,
//! and both states are reachable from each other.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visibility state of an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishState {
    /// Only visible on the authoring surface.
    #[default]
    Draft,
    /// Visible on public listings and slug lookups.
    Published,
}

impl PublishState {
    #[must_use]
    pub const fn from_flag(published: bool) -> Self {
        if published {
            Self::Published
        } else {
            Self::Draft
        }
    }

    #[must_use]
    pub const fn is_published(self) -> bool {
        matches!(self, Self::Published)
    }

    /// The transition an update from `self` to `next` performs.
    #[must_use]
    pub const fn transition_to(self, next: Self) -> Transition {
        match (self, next) {
            (Self::Draft, Self::Published) => Transition::Publish,
            (Self::Published, Self::Draft) => Transition::Unpublish,
            _ => Transition::Unchanged,
        }
    }
}

impl From<bool> for PublishState {
    fn from(published: bool) -> Self {
        Self::from_flag(published)
    }
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft",
            Self::Published => "published",
        })
    }
}

/// Effect of a write on the publish state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Publish,
    Unpublish,
    Unchanged,
}
