//! Who is acting, and whether they may author.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: String,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Authentication collaborator consulted before any authoring write.
pub trait Session: Send + Sync {
    fn current_user(&self) -> Option<User>;

    fn is_admin(&self, user: &User) -> bool;
}

/// A session fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<User>,
    admin: bool,
}

impl StaticSession {
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            user: Some(User::new(id)),
            admin: true,
        }
    }

    pub fn visitor(id: impl Into<String>) -> Self {
        Self {
            user: Some(User::new(id)),
            admin: false,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl Session for StaticSession {
    fn current_user(&self) -> Option<User> {
        self.user.clone()
    }

    fn is_admin(&self, _user: &User) -> bool {
        self.admin
    }
}

/// The OS user running the process; admin when they own the blog.
#[derive(Debug, Clone)]
pub struct LocalSession {
    owner: String,
}

impl LocalSession {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }
}

impl Session for LocalSession {
    fn current_user(&self) -> Option<User> {
        let name = whoami::realname();
        (!name.trim().is_empty()).then(|| User::new(name))
    }

    fn is_admin(&self, user: &User) -> bool {
        user.id() == self.owner
    }
}
