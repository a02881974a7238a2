//! Signup and login payloads

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Signup request. Every field is required; missing ones are reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "a@x.com")]
    pub email: Option<String>,
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "pw")]
    pub password: Option<String>,
    #[schema(example = "user")]
    pub usertype: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "a@x.com")]
    pub email: Option<String>,
    #[schema(example = "pw")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub auth_token: String,
    #[schema(example = "Logged in successfully!")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    #[schema(example = "success")]
    pub status: String,
    #[schema(example = "Successfully logged out!")]
    pub message: String,
}
