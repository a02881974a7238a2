//! Authentication and authorization
//!
//! - [`token`]: issues and verifies signed, time-bound auth tokens
//! - [`gate`]: turns the `Authorization` header into a request-scoped identity
//! - [`password`]: one-way credential hashing

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{authorize, authorize_headers, require_token, Caller, TOKEN_REQUIRED};
pub use password::{hash_password, verify_password};
pub use token::{Assertion, Claims, TokenCodec, TokenError, EXPIRED_TOKEN, INVALID_TOKEN};
