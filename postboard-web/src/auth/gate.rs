//! Authorization gate for protected operations
//!
//! The gate reads the `Authorization` header, verifies the token and produces
//! the caller's [`Identity`]. The identity is handed to the handler for this
//! request only: either as the [`Caller`] extractor argument or as a request
//! extension inserted by [`require_token`].

use super::token::{TokenCodec, INVALID_TOKEN};
use crate::{error::ApiError, AppState};
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use postboard_core::{BoardError, BoardResult, Identity};
use tracing::debug;

/// Reason returned when no credentials were sent
pub const TOKEN_REQUIRED: &str = "Token Required";

/// Validate an `Authorization` header value of the form `<scheme> <token>`.
///
/// The second whitespace-separated field is the token; the scheme itself is
/// not inspected.
pub fn authorize(codec: &TokenCodec, header: Option<&str>) -> BoardResult<Identity> {
    let header = header
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| BoardError::unauthenticated(TOKEN_REQUIRED, "gate"))?;

    let token = header
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| BoardError::unauthenticated(INVALID_TOKEN, "gate"))?;

    let assertion = codec.decode(token)?;
    debug!(
        subject = %assertion.identity.subject_id,
        role = %assertion.identity.role,
        "Token accepted"
    );

    Ok(assertion.identity)
}

/// Run [`authorize`] against a header map
pub fn authorize_headers(codec: &TokenCodec, headers: &HeaderMap) -> BoardResult<Identity> {
    let header = match headers.get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| BoardError::unauthenticated(INVALID_TOKEN, "gate"))?,
        ),
        None => None,
    };

    authorize(codec, header)
}

/// Authenticated caller of a protected handler
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

impl<S> FromRequestParts<S> for Caller
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already verified by `require_token` for this request
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(Caller(identity.clone()));
        }

        let app_state = AppState::from_ref(state);
        let identity = authorize_headers(&app_state.codec, &parts.headers)?;
        Ok(Caller(identity))
    }
}

/// Middleware that rejects unauthenticated requests and stores the caller's
/// identity in the request extensions
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = authorize_headers(&state.codec, request.headers())?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
