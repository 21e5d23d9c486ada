/*
 * Responsibility
 * - auth provider が返す session の型 (UserSession / SessionUser / Role)
 * - 中身は検証しない。未知のフィールドはそのまま通す
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A session as returned by the auth provider.
///
/// Only `user.id` and `user.role` are read by the guard. Everything else
/// (`session`, plugin fields, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub user: SessionUser,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user's role: either a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Role {
    One(String),
    Many(Vec<String>),
}

impl Role {
    /// Single role: membership in `required`. List: non-empty intersection.
    pub fn matches_any(&self, required: &[String]) -> bool {
        match self {
            Role::One(role) => required.iter().any(|r| r == role),
            Role::Many(roles) => roles.iter().any(|role| required.contains(role)),
        }
    }
}

impl UserSession {
    pub fn new(user: SessionUser) -> Self {
        Self {
            user,
            rest: Map::new(),
        }
    }

    pub fn has_any_role(&self, required: &[String]) -> bool {
        self.user
            .role
            .as_ref()
            .is_some_and(|role| role.matches_any(required))
    }
}

impl SessionUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: None,
            extra: Map::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(Role::One(role.into()));
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role = Some(Role::Many(roles.into_iter().map(Into::into).collect()));
        self
    }
}
