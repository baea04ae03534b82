// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! Authentication endpoints.

use axum::{extract::State, http::request::Parts, Json};
use serde::Serialize;
use serde_json::Value;

use crate::auth::{extractor::bearer_token, AuthError, Session};
use crate::state::AppState;

/// Response for POST /auth.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub data: TokenData,
}

#[derive(Debug, Serialize)]
pub struct TokenData {
    /// The internal session token.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Session lifetime in seconds.
    pub expires_in: i64,
}

/// Response for GET /auth/me.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: Value,
    pub username: Value,
    pub roles: Value,
    /// The full decoded session payload.
    pub raw_claims: Value,
}

/// Exchange an external identity token for an internal session token.
///
/// The external token arrives as the bearer credential; on success the
/// response carries the freshly issued session token and its lifetime.
pub async fn authenticate(
    State(state): State<AppState>,
    parts: Parts,
) -> Result<Json<AuthResponse>, AuthError> {
    let external_token = bearer_token(&parts)?;
    let outcome = state.auth.authenticate(external_token).await?;

    Ok(Json(AuthResponse {
        success: true,
        data: TokenData {
            access_token: outcome.internal_token,
            token_type: "bearer".to_string(),
            expires_in: state.auth.sessions().lifetime_minutes() * 60,
        },
    }))
}

/// Describe the current session.
pub async fn me(Session(session): Session) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: session.get("sub").cloned().unwrap_or(Value::Null),
        username: session.get("username").cloned().unwrap_or(Value::Null),
        roles: session
            .get("roles")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        raw_claims: session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_serializes_envelope() {
        let response = AuthResponse {
            success: true,
            data: TokenData {
                access_token: "token".to_string(),
                token_type: "bearer".to_string(),
                expires_in: 1800,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["access_token"], "token");
        assert_eq!(json["data"]["token_type"], "bearer");
        assert_eq!(json["data"]["expires_in"], 1800);
    }

    #[tokio::test]
    async fn me_reads_session_fields() {
        let session = serde_json::json!({
            "sub": "user-1",
            "username": "alice",
            "roles": ["admin"],
            "type": "stowgate_session"
        });

        let Json(response) = me(Session(session.clone())).await;
        assert_eq!(response.user_id, "user-1");
        assert_eq!(response.username, "alice");
        assert_eq!(response.roles, serde_json::json!(["admin"]));
        assert_eq!(response.raw_claims, session);
    }

    #[tokio::test]
    async fn me_defaults_missing_fields() {
        let Json(response) = me(Session(serde_json::json!({}))).await;
        assert_eq!(response.user_id, Value::Null);
        assert_eq!(response.roles, serde_json::json!([]));
    }
}
