//! Reader-submitted contact messages. Insert-only; the author can list them.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::validate::{ValidationError, validate_contact};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    id: Uuid,
    name: String,
    email: String,
    message: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl ContactEntry {
    /// Validate a draft and stamp it. Values are stored trimmed.
    ///
    /// # Errors
    /// Returns the first rule the draft violates.
    pub fn from_draft(draft: &ContactDraft) -> Result<Self, ValidationError> {
        validate_contact(draft)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name().trim().to_string(),
            email: draft.email().trim().to_string(),
            message: draft.message().trim().to_string(),
            created_at: OffsetDateTime::now_utc(),
        })
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    name: String,
    email: String,
    message: String,
}

impl ContactDraft {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
