//! Types shared by several handlers

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// `{"message": ...}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User signed up successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{"msg": ...}` returned after creating a post
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "post created successfully")]
    pub msg: String,
}

/// Filters accepted by the listing endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Keep records whose username contains this text (case-sensitive)
    pub username: Option<String>,
    /// Maximum number of records; 0, empty or non-numeric means no limit
    #[serde(default, deserialize_with = "lenient_limit")]
    pub limit: Option<usize>,
}

fn lenient_limit<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}

impl ListQuery {
    /// Apply the username filter and limit, keeping the input order
    pub fn apply<T>(&self, items: Vec<T>, username_of: impl Fn(&T) -> &str) -> Vec<T> {
        let filtered = items.into_iter().filter(|item| match &self.username {
            Some(needle) if !needle.is_empty() => username_of(item).contains(needle.as_str()),
            _ => true,
        });

        match self.limit {
            Some(limit) if limit > 0 => filtered.take(limit).collect(),
            _ => filtered.collect(),
        }
    }
}
