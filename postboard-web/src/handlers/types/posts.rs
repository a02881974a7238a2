//! Post resource types

use postboard_core::Post;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostListResponse {
    pub data: Vec<Post>,
    #[schema(example = "success")]
    pub msg: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    #[schema(example = "Hello world")]
    pub title: Option<String>,
    /// Author of the post
    #[schema(example = "alice")]
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    #[schema(example = "Renamed")]
    pub title: Option<String>,
}
