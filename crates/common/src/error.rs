//! Common error types and handling for Threadline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Threadline service
///
/// Every failure a webhook or read request can produce maps onto one of the
/// taxonomy codes returned by [`Error::error_code`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Conversation closed: {0}")]
    ClosedConversation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidPayload(_) | Error::ClosedConversation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Unexpected(_) | Error::Database(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidPayload(_) => "invalid_payload",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::ClosedConversation(_) => "closed_conversation",
            Error::Unexpected(_) | Error::Database(_) | Error::Internal(_) => "internal",
        }
    }

    /// Message safe to hand back to the caller.
    ///
    /// Server-side failures are reported generically; their detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            Error::InvalidPayload(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::ClosedConversation(msg) => msg.clone(),
            Error::Unexpected(_) | Error::Database(_) | Error::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal server error");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "Request rejected");
        }

        let body = Json(json!({
            "error": self.public_message(),
            "code": self.error_code(),
        }));

        (status, body).into_response()
    }
}
