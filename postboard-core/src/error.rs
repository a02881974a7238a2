//! Unified error handling system
//!
//! Every failure a request can hit is one `BoardError` variant, and each variant
//! maps to exactly one HTTP status class.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type BoardResult<T> = Result<T, BoardError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error context providing additional information for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }
}

/// Main error type for Postboard
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Authentication error: {reason}")]
    Authentication {
        reason: String,
        context: ErrorContext,
    },

    #[error("Authorization error: {message}")]
    Authorization {
        message: String,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },
}

impl BoardError {
    pub fn validation(message: impl Into<String>, component: &str) -> Self {
        BoardError::Validation {
            message: message.into(),
            field: None,
            context: ErrorContext::new(component),
        }
    }

    pub fn conflict(message: impl Into<String>, component: &str) -> Self {
        BoardError::Conflict {
            message: message.into(),
            context: ErrorContext::new(component),
        }
    }

    pub fn not_found(resource: impl Into<String>, component: &str) -> Self {
        BoardError::NotFound {
            resource: resource.into(),
            context: ErrorContext::new(component),
        }
    }

    pub fn unauthenticated(reason: impl Into<String>, component: &str) -> Self {
        BoardError::Authentication {
            reason: reason.into(),
            context: ErrorContext::new(component),
        }
    }

    pub fn forbidden(message: impl Into<String>, component: &str) -> Self {
        BoardError::Authorization {
            message: message.into(),
            context: ErrorContext::new(component),
        }
    }

    pub fn storage<E>(message: impl Into<String>, source: E, component: &str) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        BoardError::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
            context: ErrorContext::new(component),
        }
    }

    pub fn internal(message: impl Into<String>, component: &str) -> Self {
        BoardError::Internal {
            message: message.into(),
            source: None,
            context: ErrorContext::new(component),
        }
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            BoardError::Validation { context, .. }
            | BoardError::Conflict { context, .. }
            | BoardError::NotFound { context, .. }
            | BoardError::Authentication { context, .. }
            | BoardError::Authorization { context, .. }
            | BoardError::Storage { context, .. }
            | BoardError::Config { context, .. }
            | BoardError::Internal { context, .. } => context,
        }
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            BoardError::Validation { .. } => 400,
            BoardError::Authentication { .. } => 401,
            BoardError::Authorization { .. } => 403,
            BoardError::NotFound { .. } => 404,
            BoardError::Conflict { .. } => 409,
            BoardError::Storage { .. }
            | BoardError::Config { .. }
            | BoardError::Internal { .. } => 500,
        }
    }

    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            BoardError::Validation { .. } => "validation_error",
            BoardError::Conflict { .. } => "conflict",
            BoardError::NotFound { .. } => "not_found",
            BoardError::Authentication { .. } => "unauthorized",
            BoardError::Authorization { .. } => "forbidden",
            BoardError::Storage { .. }
            | BoardError::Config { .. }
            | BoardError::Internal { .. } => "internal_error",
        }
    }

    /// True for failures caused by the client request rather than the server
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Message that is safe to show to a client.
    ///
    /// Server-side failures are reported generically.
    pub fn public_message(&self) -> String {
        match self {
            BoardError::Validation { message, .. }
            | BoardError::Conflict { message, .. }
            | BoardError::Authorization { message, .. } => message.clone(),
            BoardError::NotFound { resource, .. } => resource.clone(),
            BoardError::Authentication { reason, .. } => reason.clone(),
            BoardError::Storage { .. }
            | BoardError::Config { .. }
            | BoardError::Internal { .. } => "Something went wrong".to_string(),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let context = self.context();
        if self.is_client_error() {
            warn!(
                error_id = %context.error_id,
                component = %context.component,
                error = %self,
                "Request rejected"
            );
        } else {
            error!(
                error_id = %context.error_id,
                component = %context.component,
                operation = ?context.operation,
                error = %self,
                source = ?std::error::Error::source(self).map(|s| s.to_string()),
                "Request failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(BoardError::validation("x", "t").status_code(), 400);
        assert_eq!(BoardError::conflict("x", "t").status_code(), 409);
        assert_eq!(BoardError::not_found("x", "t").status_code(), 404);
        assert_eq!(BoardError::unauthenticated("x", "t").status_code(), 401);
        assert_eq!(BoardError::forbidden("x", "t").status_code(), 403);
        assert_eq!(BoardError::internal("x", "t").status_code(), 500);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "down");
        assert_eq!(BoardError::storage("x", io, "t").status_code(), 500);
    }

    #[test]
    fn server_errors_hide_details() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection refused");
        let err = BoardError::storage("users collection unreachable", io, "store");
        assert!(!err.is_client_error());
        assert_eq!(err.public_message(), "Something went wrong");
        assert!(err.to_string().contains("unreachable"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn client_errors_keep_message() {
        let err = BoardError::unauthenticated("Token Required", "gate");
        assert_eq!(err.public_message(), "Token Required");
        assert_eq!(err.kind(), "unauthorized");
        assert_eq!(err.context().component, "gate");
    }
}
