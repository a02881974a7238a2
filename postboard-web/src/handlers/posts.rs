//! Post resource handlers

use super::{
    present,
    types::{CreatePostRequest, CreatedResponse, ListQuery, PostListResponse, UpdatePostRequest},
    JsonBody, QueryParams, NOT_AUTHORIZED,
};
use crate::{auth::Caller, error::ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use postboard_core::{BoardError, BoardResult, Identity, Post, PostChanges};
use tracing::{info, warn};

fn post_not_found(post_id: &str) -> BoardError {
    warn!("404 Not Found: Post {} not found", post_id);
    BoardError::not_found(format!("Post with ID {} not found", post_id), "posts")
}

/// Load the post and check that the caller wrote it or is an admin
async fn managed_post(state: &AppState, identity: &Identity, post_id: &str) -> BoardResult<Post> {
    let post = state
        .directory
        .post_by_id(post_id)
        .await?
        .ok_or_else(|| post_not_found(post_id))?;

    if !identity.may_manage_post(&post) {
        return Err(BoardError::unauthenticated(NOT_AUTHORIZED, "posts"));
    }
    Ok(post)
}

/// List posts
#[utoipa::path(
    get,
    path = "/posts/",
    tag = "Posts",
    params(ListQuery),
    responses(
        (status = 200, description = "Posts, newest first", body = PostListResponse)
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<PostListResponse>> {
    let posts = state.directory.list_posts().await?;
    let data = query.apply(posts, |p| p.username.as_str());

    Ok(Json(PostListResponse {
        data,
        msg: "success".to_string(),
    }))
}

/// Create a post on behalf of `username`
#[utoipa::path(
    post,
    path = "/posts/",
    tag = "Posts",
    request_body = CreatePostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Post created", body = CreatedResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Caller is not the author"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    Caller(identity): Caller,
    JsonBody(request): JsonBody<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let (Some(title), Some(username)) = (present(request.title), present(request.username))
    else {
        return Err(BoardError::validation("Please fill up all the fields.", "posts").into());
    };

    let author = state
        .directory
        .account_by_username(&username)
        .await?
        .ok_or_else(|| BoardError::not_found("No user found with this username", "posts"))?;

    if !identity.may_post_as(&author) {
        return Err(BoardError::unauthenticated(NOT_AUTHORIZED, "posts").into());
    }

    let post = Post::new(&author, title);
    info!(post_id = %post.post_id, author = %author.username, "Creating post");
    state.directory.insert_post(post).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            msg: "post created successfully".to_string(),
        }),
    ))
}

/// Get a single post
#[utoipa::path(
    get,
    path = "/posts/{post_id}",
    tag = "Posts",
    params(("post_id" = String, Path, description = "Post identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The post", body = Post),
        (status = 401, description = "Missing, expired or invalid token"),
        (status = 404, description = "No such post")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Caller(_identity): Caller,
    Path(post_id): Path<String>,
) -> ApiResult<Json<Post>> {
    let post = state
        .directory
        .post_by_id(&post_id)
        .await?
        .ok_or_else(|| post_not_found(&post_id))?;
    Ok(Json(post))
}

/// Change a post's title
#[utoipa::path(
    put,
    path = "/posts/{post_id}",
    tag = "Posts",
    params(("post_id" = String, Path, description = "Post identifier")),
    request_body = UpdatePostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated post", body = Post),
        (status = 400, description = "Missing title"),
        (status = 401, description = "Caller is not the author"),
        (status = 404, description = "No such post")
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(post_id): Path<String>,
    JsonBody(request): JsonBody<UpdatePostRequest>,
) -> ApiResult<Json<Post>> {
    managed_post(&state, &identity, &post_id).await?;

    let changes = PostChanges {
        title: present(request.title),
    };
    if changes.is_empty() {
        return Err(BoardError::validation("Please provide a title", "posts").into());
    }

    let post = state
        .directory
        .update_post(&post_id, &changes)
        .await?
        .ok_or_else(|| post_not_found(&post_id))?;

    info!("Post {} updated", post_id);
    Ok(Json(post))
}

/// Delete a post
#[utoipa::path(
    delete,
    path = "/posts/{post_id}",
    tag = "Posts",
    params(("post_id" = String, Path, description = "Post identifier")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Caller is not the author"),
        (status = 404, description = "No such post")
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(post_id): Path<String>,
) -> ApiResult<StatusCode> {
    managed_post(&state, &identity, &post_id).await?;

    if !state.directory.delete_post(&post_id).await? {
        return Err(post_not_found(&post_id).into());
    }

    info!("Post {} deleted", post_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_app;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use http_body_util::BodyExt;
    use postboard_core::{Account, AccountChanges, Role};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn account(state: &AppState, username: &str, role: Role) -> (Account, String) {
        let account = Account::new(
            username.to_string(),
            format!("{}@x.com", username),
            "unused".to_string(),
            role,
        );
        state.directory.insert_account(account.clone()).await.unwrap();
        let token = state.codec.issue(&Identity::for_account(&account)).unwrap();
        (account, token)
    }

    async fn call(
        state: &AppState,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = create_app(state.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn first_post_id(state: &AppState) -> String {
        state.directory.list_posts().await.unwrap()[0].post_id.clone()
    }

    #[tokio::test]
    async fn create_checks_author_and_username() {
        let state = AppState::in_memory();
        account(&state, "alice", Role::Standard).await;
        let (_, bob_token) = account(&state, "bob", Role::Standard).await;
        let (_, admin_token) = account(&state, "root", Role::Admin).await;

        let (status, _) = call(
            &state,
            "POST",
            "/posts/",
            None,
            Some(json!({"title": "t", "username": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            &state,
            "POST",
            "/posts/",
            Some(&bob_token),
            Some(json!({"title": "t", "username": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], NOT_AUTHORIZED);

        let (status, _) = call(
            &state,
            "POST",
            "/posts/",
            Some(&bob_token),
            Some(json!({"title": "t", "username": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            &state,
            "POST",
            "/posts/",
            Some(&bob_token),
            Some(json!({"title": "mine", "username": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["msg"], "post created successfully");

        let (status, _) = call(
            &state,
            "POST",
            "/posts/",
            Some(&admin_token),
            Some(json!({"title": "for alice", "username": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(&state, "GET", "/posts/?username=ali", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["email"], "alice@x.com");
    }

    #[tokio::test]
    async fn create_requires_the_token_email() {
        let state = AppState::in_memory();
        let (alice, alice_token) = account(&state, "alice", Role::Standard).await;

        let changes = AccountChanges {
            email: Some("new@x.com".to_string()),
            ..Default::default()
        };
        state
            .directory
            .update_account(&alice.user_id, &changes)
            .await
            .unwrap();

        let (status, body) = call(
            &state,
            "POST",
            "/posts/",
            Some(&alice_token),
            Some(json!({"title": "stale", "username": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], NOT_AUTHORIZED);
        assert!(state.directory.list_posts().await.unwrap().is_empty());

        let moved = state
            .directory
            .account_by_id(&alice.user_id)
            .await
            .unwrap()
            .unwrap();
        let fresh_token = state.codec.issue(&Identity::for_account(&moved)).unwrap();

        let (status, _) = call(
            &state,
            "POST",
            "/posts/",
            Some(&fresh_token),
            Some(json!({"title": "fresh", "username": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/posts/{}", first_post_id(&state).await);
        let (status, body) = call(
            &state,
            "PUT",
            &uri,
            Some(&fresh_token),
            Some(json!({"title": "edited"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "edited");
    }

    #[tokio::test]
    async fn listing_is_public_single_read_needs_token() {
        let state = AppState::in_memory();
        let (alice, alice_token) = account(&state, "alice", Role::Standard).await;
        state
            .directory
            .insert_post(Post::new(&alice, "hello".to_string()))
            .await
            .unwrap();
        let uri = format!("/posts/{}", first_post_id(&state).await);

        let (status, body) = call(&state, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token Required");

        let (status, body) = call(&state, "GET", &uri, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "hello");

        let (status, _) = call(&state, "GET", "/posts/missing", Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&state, "GET", "/posts/?limit=0", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = call(&state, "GET", "/posts/?limit=many", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_author_or_admin_may_modify() {
        let state = AppState::in_memory();
        let (alice, alice_token) = account(&state, "alice", Role::Standard).await;
        let (_, bob_token) = account(&state, "bob", Role::Standard).await;
        let (_, admin_token) = account(&state, "root", Role::Admin).await;
        state
            .directory
            .insert_post(Post::new(&alice, "hello".to_string()))
            .await
            .unwrap();
        let uri = format!("/posts/{}", first_post_id(&state).await);

        let retitle = |title: &str| Some(json!({ "title": title }));

        let (status, _) = call(&state, "PUT", &uri, Some(&bob_token), retitle("x")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = call(&state, "DELETE", &uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(&state, "PUT", &uri, Some(&alice_token), retitle("edited")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "edited");

        let (status, body) =
            call(&state, "PUT", &uri, Some(&admin_token), retitle("moderated")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "moderated");

        let (status, _) = call(&state, "DELETE", &uri, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&state, "DELETE", &uri, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
