//! Route definitions
//!
//! Collection paths are served with and without the trailing slash.

use crate::{auth::require_token, handlers, openapi, AppState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

/// Signup, login and token endpoints
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", get(handlers::logout))
        .route("/auth/authenticate", get(handlers::authenticate))
}

/// User resource; every route requires a valid token
pub fn users_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/", get(handlers::list_users))
        .route(
            "/users/{user_id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/users/{user_id}/posts",
            get(handlers::list_user_posts)
                .post(handlers::create_user_post)
                .delete(handlers::delete_user_post),
        )
        .route("/users/{user_id}/links", get(handlers::user_links))
        .route_layer(middleware::from_fn_with_state(state, require_token))
}

/// Post resource; the listing is public, every other handler checks the token
pub fn posts_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/posts/",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/posts/{post_id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
}

/// Health and API description
pub fn meta_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
}

/// Create all routes combined
pub fn all_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(users_routes(state))
        .merge(posts_routes())
        .merge(meta_routes())
}
