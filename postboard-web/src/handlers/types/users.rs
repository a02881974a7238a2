//! User resource types

use postboard_core::AccountView;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<AccountView>,
    #[schema(example = "success")]
    pub msg: String,
}

/// Partial account update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Only admins may change the account type
    #[schema(example = "admin")]
    pub usertype: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserPostRequest {
    #[schema(example = "Hello world")]
    pub title: Option<String>,
}

/// Hypermedia link
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Link {
    #[schema(example = "/users/8c1f.../posts")]
    pub href: String,
    #[schema(example = "posts")]
    pub rel: String,
}

/// Account with links to related resources
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserLinksResponse {
    #[serde(flatten)]
    pub user: AccountView,
    pub links: Vec<Link>,
}

impl UserLinksResponse {
    pub fn new(user: AccountView) -> Self {
        let base = format!("/users/{}", user.user_id);
        let links = vec![
            Link {
                href: base.clone(),
                rel: "self".to_string(),
            },
            Link {
                href: format!("{}/posts", base),
                rel: "posts".to_string(),
            },
        ];
        Self { user, links }
    }
}
