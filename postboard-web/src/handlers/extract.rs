//! Extractors whose rejections use the service's error body

use crate::error::ApiError;
use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    FromRequest, FromRequestParts,
};
use postboard_core::BoardError;

/// JSON request body. Malformed or missing bodies are validation errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(BoardError::validation(
            format!("Invalid request body: {}", rejection.body_text()),
            "request",
        ))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(BoardError::validation(
            format!("Invalid query string: {}", rejection.body_text()),
            "request",
        ))
    }
}
