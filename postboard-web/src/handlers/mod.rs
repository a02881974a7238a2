//! HTTP request handlers
//!
//! - [`auth`]: signup, login, logout and token validation
//! - [`users`]: the user resource and its nested posts
//! - [`posts`]: the post resource
//! - [`health`]: liveness probe

pub mod auth;
pub mod extract;
pub mod health;
pub mod posts;
pub mod types;
pub mod users;

pub use auth::*;
pub use extract::{JsonBody, QueryParams};
pub use health::*;
pub use posts::*;
pub use users::*;

pub use types::*;

/// Rejection message for ownership failures
pub(crate) const NOT_AUTHORIZED: &str = "Not Authorized";

/// Treat blank strings like absent fields
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
