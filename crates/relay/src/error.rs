use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failures of the chat relay, one per class of caller-visible outcome.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The body did not deserialize into a conversation. Raised before any upstream call.
    #[error("Invalid request format")]
    InvalidRequest,

    /// The upstream API answered with a non-success status and a JSON error body.
    #[error("Error from API service ({status})")]
    Upstream {
        /// Status code returned by the upstream API.
        status: u16,
        /// The upstream error body, forwarded as-is.
        details: serde_json::Value,
    },

    /// Anything else: transport failures, unreadable or non-JSON bodies.
    /// The message names the failing stage and never carries upstream text.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Full causes are logged where the error is created.
        if status.is_server_error() {
            log::error!("Chat relay failed ({}): {self}", status.as_u16());
        }

        let body = match &self {
            Self::InvalidRequest => ErrorResponse {
                error: "Invalid request format",
                details: None,
                message: None,
            },
            Self::Upstream { details, .. } => ErrorResponse {
                error: "Error from API service",
                details: Some(details),
                message: None,
            },
            Self::Internal(message) => ErrorResponse {
                error: "Internal server error",
                details: None,
                message: Some(message),
            },
        };

        (status, Json(body)).into_response()
    }
}
