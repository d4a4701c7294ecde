// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of pipeline errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use wacast_core::WacastError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Provider error code, for rejected sends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

/// A [`WacastError`] returned from a handler.
#[derive(Debug)]
pub struct ApiError(pub WacastError);

impl From<WacastError> for ApiError {
    fn from(err: WacastError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            WacastError::NotFound { .. } => StatusCode::NOT_FOUND,
            WacastError::EmptyTargetSet => StatusCode::UNPROCESSABLE_ENTITY,
            WacastError::ProviderRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WacastError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            WacastError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            WacastError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            WacastError::Channel { .. } | WacastError::Queue { .. } => StatusCode::BAD_GATEWAY,
            WacastError::Storage { .. } | WacastError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = match self.0 {
            // Provider text is passed through untouched.
            WacastError::ProviderRejected { code, message } => ErrorResponse {
                error: message,
                code,
            },
            other => ErrorResponse {
                error: other.to_string(),
                code: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError(WacastError::EmptyTargetSet).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError(WacastError::not_found("campaign", "x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(WacastError::Queue {
                message: "down".into(),
                source: None
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
