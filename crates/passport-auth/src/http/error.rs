//! Error responses for the decision endpoints.
//!
//! Errors that reach the HTTP layer are never redirects. They are rendered
//! as an RFC 6749 JSON error body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);

        if status.is_server_error() {
            tracing::error!(error = %self, category = %self.category(), "Authorization decision failed");
        } else {
            tracing::warn!(error = %self, category = %self.category(), "Authorization decision rejected");
        }

        let body = json!({
            "error": self.oauth_error_code(),
            "error_description": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

/// Maps an error to its HTTP status.
#[must_use]
pub fn status_code(error: &AuthError) -> StatusCode {
    match error {
        AuthError::PreconditionFailed { .. } => StatusCode::BAD_REQUEST,
        AuthError::InvalidAuthToken => StatusCode::BAD_REQUEST,
        AuthError::InvalidClient { .. } => StatusCode::UNAUTHORIZED,
        AuthError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        AuthError::UnsupportedGrantType { .. } => StatusCode::BAD_REQUEST,
        AuthError::Storage { .. }
        | AuthError::Configuration { .. }
        | AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
