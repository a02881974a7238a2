//! Authentication handlers: signup, login, logout and token validation

use super::{
    present,
    types::{LoginRequest, LoginResponse, LogoutResponse, MessageResponse, SignupRequest},
    JsonBody,
};
use crate::{
    auth::{hash_password, verify_password, Caller},
    error::ApiResult,
    AppState,
};
use axum::{extract::State, response::Json};
use postboard_core::{Account, BoardError, Identity, Role};
use tracing::info;

/// Create an account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User signed up", body = MessageResponse),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Email or username already taken")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (Some(email), Some(username), Some(password), Some(usertype)) = (
        present(request.email),
        present(request.username),
        present(request.password),
        present(request.usertype),
    ) else {
        return Err(
            BoardError::validation("Please fill up all the required fields", "signup").into(),
        );
    };

    info!("User signup attempt: {}", username);

    if state.directory.count_accounts_by_email(&email).await? > 0 {
        return Err(BoardError::conflict(
            "User with this email already exists. Please login.",
            "signup",
        )
        .into());
    }
    if state.directory.count_accounts_by_username(&username).await? > 0 {
        return Err(BoardError::conflict(
            "User with this username already exists. Please login.",
            "signup",
        )
        .into());
    }

    let password_hash = hash_password(&password)?;
    let account = Account::new(username, email, password_hash, Role::parse(&usertype));
    let user_id = account.user_id.clone();
    state.directory.insert_account(account).await?;

    info!(user_id = %user_id, "User signed up successfully");
    Ok(Json(MessageResponse::new("User signed up successfully")))
}

/// Exchange email and password for an auth token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (Some(email), Some(password)) = (present(request.email), present(request.password))
    else {
        return Err(BoardError::validation("Please fill up all the fields.", "login").into());
    };

    let account = state
        .directory
        .account_by_email(&email)
        .await?
        .ok_or_else(|| BoardError::not_found("User doesn't exist.", "login"))?;

    if !verify_password(&password, &account.password_hash)? {
        return Err(BoardError::unauthenticated("Wrong password.", "login").into());
    }

    let auth_token = state
        .codec
        .issue(&Identity::for_account(&account))
        .map_err(BoardError::from)?;

    info!(user_id = %account.user_id, "User logged in");
    Ok(Json(LoginResponse {
        auth_token,
        message: "Logged in successfully!".to_string(),
    }))
}

/// Logout. Tokens stay valid until they expire; clients discard them.
#[utoipa::path(
    get,
    path = "/auth/logout",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 401, description = "Missing, expired or invalid token")
    )
)]
pub async fn logout(Caller(identity): Caller) -> Json<LogoutResponse> {
    info!("User logout: {}", identity.subject_id);

    Json(LogoutResponse {
        status: "success".to_string(),
        message: "Successfully logged out!".to_string(),
    })
}

/// Check that the presented token is valid
#[utoipa::path(
    get,
    path = "/auth/authenticate",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid", body = MessageResponse),
        (status = 401, description = "Missing, expired or invalid token")
    )
)]
pub async fn authenticate(Caller(identity): Caller) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!(
        "This {} token is valid.",
        identity.role
    )))
}
