//! Core data type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Account role.
///
/// Only `admin` is distinguished; every other stored value is a standard user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    #[default]
    Standard,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Standard => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Parse a user-supplied role. Comparison ignores case and surrounding whitespace.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Standard
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::parse(value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted account record, including the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(rename = "usertype")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a generated identifier.
    ///
    /// `password_hash` must already be hashed; this type never sees plaintext.
    pub fn new(username: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    /// Public projection without the password hash
    pub fn view(&self) -> AccountView {
        AccountView {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Account as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AccountView {
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "usertype")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "user"))]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        account.view()
    }
}

/// Partial update applied to an account. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }

    pub fn apply(&self, account: &mut Account) {
        if let Some(username) = &self.username {
            account.username = username.clone();
        }
        if let Some(email) = &self.email {
            account.email = email.clone();
        }
        if let Some(hash) = &self.password_hash {
            account.password_hash = hash.clone();
        }
        if let Some(role) = self.role {
            account.role = role;
        }
    }
}

/// Persisted post record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Post {
    pub post_id: String,
    pub username: String,
    pub email: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a post authored by `author`
    pub fn new(author: &Account, title: String) -> Self {
        Self {
            post_id: Uuid::new_v4().to_string(),
            username: author.username.clone(),
            email: author.email.clone(),
            title,
            created_at: Utc::now(),
        }
    }
}

/// Partial update applied to a post
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostChanges {
    pub title: Option<String>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }

    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
    }
}

/// Identity of the caller of a protected operation.
///
/// Built from a verified token for the duration of one request and passed to
/// handlers by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl Identity {
    pub fn for_account(account: &Account) -> Self {
        Self {
            subject_id: account.user_id.clone(),
            email: account.email.clone(),
            display_name: account.username.clone(),
            role: account.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn owns_account(&self, account: &Account) -> bool {
        self.subject_id == account.user_id
    }

    pub fn owns_post(&self, post: &Post) -> bool {
        self.email == post.email
    }

    /// Owner or admin
    pub fn may_manage_account(&self, account: &Account) -> bool {
        self.is_admin() || self.owns_account(account)
    }

    /// Author or admin
    pub fn may_manage_post(&self, post: &Post) -> bool {
        self.is_admin() || self.owns_post(post)
    }

    /// Admin, or the token was issued for the account's current email.
    /// Matches `may_manage_post` for the post that would be created.
    pub fn may_post_as(&self, author: &Account) -> bool {
        self.is_admin() || self.email == author.email
    }
}
