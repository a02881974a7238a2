//! OpenAPI document for the Postboard API

use axum::response::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::{
    CreatePostRequest, CreateUserPostRequest, CreatedResponse, HealthResponse, Link, LoginRequest,
    LoginResponse, LogoutResponse, MessageResponse, PostListResponse, SignupRequest,
    UpdatePostRequest, UpdateUserRequest, UserLinksResponse, UserListResponse,
};
use postboard_core::{AccountView, Post};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Postboard API",
        version = "0.1.0",
        description = "Users, posts and token authentication",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,

        crate::handlers::signup,
        crate::handlers::login,
        crate::handlers::logout,
        crate::handlers::authenticate,

        crate::handlers::list_users,
        crate::handlers::get_user,
        crate::handlers::update_user,
        crate::handlers::delete_user,
        crate::handlers::list_user_posts,
        crate::handlers::create_user_post,
        crate::handlers::delete_user_post,
        crate::handlers::user_links,

        crate::handlers::list_posts,
        crate::handlers::create_post,
        crate::handlers::get_post,
        crate::handlers::update_post,
        crate::handlers::delete_post,
    ),
    components(
        schemas(
            HealthResponse,
            MessageResponse,
            CreatedResponse,
            SignupRequest,
            LoginRequest,
            LoginResponse,
            LogoutResponse,
            AccountView,
            UserListResponse,
            UpdateUserRequest,
            CreateUserPostRequest,
            Link,
            UserLinksResponse,
            Post,
            PostListResponse,
            CreatePostRequest,
            UpdatePostRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Signup, login and token validation"),
        (name = "Users", description = "User accounts and their posts"),
        (name = "Posts", description = "Posts"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the bearer token scheme referenced by protected operations
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
