// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! Authentication and federation errors.
//!
//! A closed set of tagged variants carrying a machine-readable kind. The HTTP
//! boundary maps kinds to status codes through a static table; the pipeline
//! itself never retries or swallows an error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error type for the federation/session pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Bad signature, wrong audience, expired or malformed token (external
    /// or internal). The specific cause is logged but not surfaced.
    #[error("invalid token")]
    InvalidToken,

    /// Role check failed.
    #[error("missing required role: {0}")]
    PermissionDenied(String),

    /// The STS endpoint answered with an error status; carries the response
    /// body.
    #[error("STS rejected federation: {0}")]
    FederationRejected(String),

    /// Connection-level failure reaching the STS endpoint (timeout, DNS,
    /// refused).
    #[error("STS endpoint unavailable: {0}")]
    ServiceUnavailable(String),

    /// Well-formed STS response missing the expected credentials.
    #[error("unexpected STS response: {0}")]
    UnexpectedFederation(String),

    /// JWKS fetch from the identity provider failed.
    #[error("failed to fetch JWKS: {0}")]
    JwksFetch(String),

    /// No usable signing key in the provider's key set.
    #[error("no matching key found in JWKS")]
    NoMatchingKey,

    /// No authorization header present.
    #[error("authorization header is required")]
    MissingAuthHeader,

    /// Authorization header is not `Bearer <token>`.
    #[error("invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,

    /// Internal error (signing or serialization failure).
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    data: Option<()>,
    error: ErrorDetail,
}

impl AuthError {
    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidToken => "invalid_token",
            AuthError::PermissionDenied(_) => "permission_denied",
            AuthError::FederationRejected(_) => "federation_rejected",
            AuthError::ServiceUnavailable(_) => "service_unavailable",
            AuthError::UnexpectedFederation(_) => "unexpected_federation",
            AuthError::JwksFetch(_) => "jwks_fetch_error",
            AuthError::NoMatchingKey => "no_matching_key",
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidToken
            | AuthError::NoMatchingKey
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader => StatusCode::UNAUTHORIZED,
            AuthError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AuthError::FederationRejected(_) => StatusCode::BAD_REQUEST,
            AuthError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::UnexpectedFederation(_)
            | AuthError::JwksFetch(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            success: false,
            data: None,
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn status_table() {
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::PermissionDenied("admin".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::FederationRejected("denied".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::ServiceUnavailable("refused".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::UnexpectedFederation("no credentials".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn response_body_carries_code_and_message() {
        let response = AuthError::PermissionDenied("admin".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "permission_denied");
        assert_eq!(body["error"]["message"], "missing required role: admin");
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let response = AuthError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
