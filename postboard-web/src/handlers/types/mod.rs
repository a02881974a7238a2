//! Request and response types used by the handlers

pub mod auth;
pub mod common;
pub mod posts;
pub mod users;

pub use auth::*;
pub use common::*;
pub use posts::*;
pub use users::*;
