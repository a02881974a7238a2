//! User resource handlers, including a user's nested posts

use super::{
    present,
    types::{
        CreateUserPostRequest, CreatedResponse, ListQuery, UpdateUserRequest, UserLinksResponse,
        UserListResponse,
    },
    JsonBody, QueryParams, NOT_AUTHORIZED,
};
use crate::{
    auth::{hash_password, Caller},
    error::ApiResult,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use postboard_core::{Account, AccountChanges, AccountView, BoardError, BoardResult, Post, Role};
use tracing::{info, warn};

async fn load_account(state: &AppState, user_id: &str) -> BoardResult<Account> {
    state.directory.account_by_id(user_id).await?.ok_or_else(|| {
        warn!("404 Not Found: User {} not found", user_id);
        BoardError::not_found(format!("User with ID {} not found", user_id), "users")
    })
}

/// Load the account and check that the caller may act on it
async fn managed_account(state: &AppState, caller: &Caller, user_id: &str) -> BoardResult<Account> {
    let account = load_account(state, user_id).await?;
    if !caller.0.may_manage_account(&account) {
        return Err(BoardError::unauthenticated(NOT_AUTHORIZED, "users"));
    }
    Ok(account)
}

/// List users
#[utoipa::path(
    get,
    path = "/users/",
    tag = "Users",
    params(ListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users, newest first", body = UserListResponse),
        (status = 401, description = "Missing, expired or invalid token")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Caller(identity): Caller,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<UserListResponse>> {
    info!(caller = %identity.subject_id, "Fetching all users");

    let accounts = state.directory.list_accounts().await?;
    let data = query
        .apply(accounts, |a| a.username.as_str())
        .iter()
        .map(Account::view)
        .collect();

    Ok(Json(UserListResponse {
        data,
        msg: "success".to_string(),
    }))
}

/// Get a single user
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "Users",
    params(("user_id" = String, Path, description = "User identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The user", body = AccountView),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    _caller: Caller,
    Path(user_id): Path<String>,
) -> ApiResult<Json<AccountView>> {
    info!("Fetching user {}", user_id);
    let account = load_account(&state, &user_id).await?;
    Ok(Json(account.view()))
}

/// Update a user. Owners may edit their own account; admins may edit any
/// account and are the only ones allowed to change the account type.
#[utoipa::path(
    put,
    path = "/users/{user_id}",
    tag = "Users",
    params(("user_id" = String, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated user", body = AccountView),
        (status = 400, description = "Nothing to update"),
        (status = 401, description = "Not the owner"),
        (status = 403, description = "Account type change by a non-admin"),
        (status = 404, description = "No such user"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<String>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> ApiResult<Json<AccountView>> {
    info!("Updating user {}", user_id);
    let account = managed_account(&state, &caller, &user_id).await?;

    let password = present(request.password);
    let mut changes = AccountChanges {
        username: present(request.username),
        email: present(request.email),
        password_hash: None,
        role: present(request.usertype).map(|value| Role::parse(&value)),
    };

    if changes.is_empty() && password.is_none() {
        return Err(BoardError::validation("Nothing to update", "users").into());
    }

    if matches!(changes.role, Some(role) if role != account.role) && !caller.0.is_admin() {
        return Err(
            BoardError::forbidden("Only admins may change the account type", "users").into(),
        );
    }

    if let Some(password) = password {
        changes.password_hash = Some(hash_password(&password)?);
    }

    let updated = state
        .directory
        .update_account(&user_id, &changes)
        .await?
        .ok_or_else(|| {
            BoardError::not_found(format!("User with ID {} not found", user_id), "users")
        })?;

    Ok(Json(updated.view()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    tag = "Users",
    params(("user_id" = String, Path, description = "User identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Not the owner"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    info!("Deleting user {}", user_id);
    managed_account(&state, &caller, &user_id).await?;

    if !state.directory.delete_account(&user_id).await? {
        return Err(
            BoardError::not_found(format!("User with ID {} not found", user_id), "users").into(),
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List a user's posts
#[utoipa::path(
    get,
    path = "/users/{user_id}/posts",
    tag = "Users",
    params(("user_id" = String, Path, description = "User identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Posts written by the user, newest first", body = [Post]),
        (status = 404, description = "No such user")
    )
)]
pub async fn list_user_posts(
    State(state): State<AppState>,
    _caller: Caller,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Post>>> {
    let account = load_account(&state, &user_id).await?;
    let posts = state.directory.posts_by_username(&account.username).await?;

    info!("Found {} posts for user {}", posts.len(), user_id);
    Ok(Json(posts))
}

/// Create a post authored by the user
#[utoipa::path(
    post,
    path = "/users/{user_id}/posts",
    tag = "Users",
    params(("user_id" = String, Path, description = "User identifier")),
    request_body = CreateUserPostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Post created", body = CreatedResponse),
        (status = 400, description = "Missing title"),
        (status = 401, description = "Not the owner"),
        (status = 404, description = "No such user")
    )
)]
pub async fn create_user_post(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<String>,
    JsonBody(request): JsonBody<CreateUserPostRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let account = managed_account(&state, &caller, &user_id).await?;

    let title = present(request.title)
        .ok_or_else(|| BoardError::validation("Please provide a title", "users"))?;

    let post = Post::new(&account, title);
    info!(post_id = %post.post_id, "Creating post for user {}", user_id);
    state.directory.insert_post(post).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            msg: "post created successfully".to_string(),
        }),
    ))
}

/// Delete the user's oldest post
#[utoipa::path(
    delete,
    path = "/users/{user_id}/posts",
    tag = "Users",
    params(("user_id" = String, Path, description = "User identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Not the owner"),
        (status = 404, description = "No such user, or the user has no posts")
    )
)]
pub async fn delete_user_post(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    let account = managed_account(&state, &caller, &user_id).await?;

    let post = state
        .directory
        .first_post_by_username(&account.username)
        .await?
        .ok_or_else(|| BoardError::not_found("Post not found", "users"))?;

    state.directory.delete_post(&post.post_id).await?;
    info!("Post {} deleted", post.post_id);

    Ok(StatusCode::NO_CONTENT)
}

/// User with links to related resources
#[utoipa::path(
    get,
    path = "/users/{user_id}/links",
    tag = "Users",
    params(("user_id" = String, Path, description = "User identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User and links", body = UserLinksResponse),
        (status = 404, description = "No such user")
    )
)]
pub async fn user_links(
    State(state): State<AppState>,
    _caller: Caller,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserLinksResponse>> {
    info!("Fetching links for user {}", user_id);
    let account = load_account(&state, &user_id).await?;
    Ok(Json(UserLinksResponse::new(account.view())))
}
