// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! Axum extractors for authenticated sessions.
//!
//! Use the `Session` extractor in handlers to require a valid internal
//! session token:
//!
//! ```rust,ignore
//! async fn my_handler(Session(session): Session) -> impl IntoResponse {
//!     // session is the decoded token payload
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde_json::Value;

use super::AuthError;
use crate::state::AppState;

/// Extractor for authenticated sessions.
///
/// Pulls the bearer token from the `Authorization` header and verifies it as
/// an internal session token. The wrapped value is the full decoded payload
/// (`sub`, `username`, `roles`, `sts`, the configured role claim, ...).
pub struct Session(pub Value);

impl FromRequestParts<AppState> for Session {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let session = state.auth.current_session(token)?;
        Ok(Session(session))
    }
}

/// Extractor that additionally requires the configured admin role.
pub struct AdminOnly(pub Value);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Session(session) = Session::from_request_parts(parts, state).await?;
        state.auth.require_admin(&session)?;
        Ok(AdminOnly(session))
    }
}

/// Pull the bearer token out of the `Authorization` header.
pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_settings;
    use crate::sts::StorageCredentials;
    use axum::http::Request;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(test_settings())
    }

    fn issue_token(state: &AppState, identity: &Value) -> String {
        let credentials = StorageCredentials {
            access_key: "AKIATEST".to_string(),
            secret_key: "secret".to_string(),
            session_token: "session-token".to_string(),
            expiration: "2026-08-30T12:00:00Z".to_string(),
        };
        state.auth.sessions().issue(identity, &credentials).unwrap()
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn session_extractor_requires_auth_header() {
        let state = test_state();
        let mut parts = parts_with_header(None);

        let result = Session::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn session_extractor_rejects_non_bearer_scheme() {
        let state = test_state();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwYXNz"));

        let result = Session::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn session_extractor_rejects_garbage_token() {
        let state = test_state();
        let mut parts = parts_with_header(Some("Bearer not.a.token"));

        let result = Session::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn session_extractor_decodes_valid_token() {
        let state = test_state();
        let token = issue_token(
            &state,
            &json!({"sub": "user-1", "preferred_username": "alice"}),
        );
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let Session(session) = Session::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(session["sub"], "user-1");
        assert_eq!(session["username"], "alice");
        assert_eq!(session["sts"]["access_key"], "AKIATEST");
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let state = test_state();
        let token = issue_token(&state, &json!({"sub": "user-1", "policy": ["user"]}));
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let state = test_state();
        let token = issue_token(&state, &json!({"sub": "user-1", "policy": ["admin"]}));
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let AdminOnly(session) = AdminOnly::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(session["sub"], "user-1");
    }
}
