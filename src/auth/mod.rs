// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! # Authentication Module
//!
//! Identity federation and session handling for the gateway.
//!
//! ## Authentication Flow
//!
//! 1. Client authenticates with the OpenID identity provider and sends
//!    `Authorization: Bearer <external JWT>` to `POST /auth`
//! 2. Gateway:
//!    - fetches the provider JWKS (cached, 10 min TTL)
//!    - verifies signature, expiry and audience of the external token
//!    - exchanges the token for temporary storage credentials via the
//!      storage endpoint's STS API
//!    - issues an internal HS256 session token bundling identity claims,
//!      storage credentials and the configured role claim
//! 3. Subsequent requests present the internal token; it is decoded and
//!    role-checked per request, never stored server-side.
//!
//! ## Security
//!
//! - External tokens are verified with RS256-class keys only
//! - JWKS fetch failures propagate; there is no stale-serving fallback
//! - Storage credentials live inside the signed session token and are
//!   treated as opaque secrets

pub mod authorize;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod session;
#[cfg(test)]
pub mod testutil;
pub mod verifier;

pub use error::AuthError;
pub use extractor::{AdminOnly, Session};
pub use jwks::JwksCache;
pub use session::SessionService;
pub use verifier::TokenVerifier;

use serde_json::Value;

use crate::config::Settings;
use crate::sts::StsClient;

/// Result of a successful authentication.
pub struct AuthOutcome {
    /// The freshly issued internal session token.
    pub internal_token: String,
    /// The verified external identity claims.
    pub identity: Value,
}

/// The federation/session pipeline, wired from [`Settings`].
///
/// Cheap to clone; the JWKS cache is the only shared state inside.
#[derive(Clone)]
pub struct AuthService {
    verifier: TokenVerifier,
    sts: StsClient,
    sessions: SessionService,
    role_claim_path: String,
    admin_role: String,
}

impl AuthService {
    pub fn from_settings(settings: &Settings) -> Self {
        let jwks = JwksCache::new(&settings.provider_url, &settings.realm);
        Self {
            verifier: TokenVerifier::new(jwks, &settings.client_id),
            sts: StsClient::new(&settings.storage_endpoint, settings.storage_secure),
            sessions: SessionService::new(
                &settings.session_secret,
                settings.session_exp_minutes,
                &settings.role_claim_path,
            ),
            role_claim_path: settings.role_claim_path.clone(),
            admin_role: settings.admin_role.clone(),
        }
    }

    /// Run the full pipeline: verify the external token, federate it into
    /// storage credentials, and issue the internal session token.
    pub async fn authenticate(&self, external_token: &str) -> Result<AuthOutcome, AuthError> {
        let identity = self.verifier.verify(external_token).await?;
        let credentials = self.sts.federate(external_token).await?;
        let internal_token = self.sessions.issue(&identity, &credentials)?;

        tracing::info!(
            sub = identity.get("sub").and_then(serde_json::Value::as_str).unwrap_or("?"),
            "authenticated and federated"
        );

        Ok(AuthOutcome {
            internal_token,
            identity,
        })
    }

    /// Decode an internal session token presented on a later request.
    pub fn current_session(&self, internal_token: &str) -> Result<Value, AuthError> {
        self.sessions.verify(internal_token)
    }

    /// Assert that a decoded session holds `required_role` at the configured
    /// role-claim path.
    pub fn require_role<'a>(
        &self,
        session: &'a Value,
        required_role: &str,
    ) -> Result<&'a Value, AuthError> {
        authorize::require_role(session, &self.role_claim_path, required_role)
    }

    /// Assert the configured admin role.
    pub fn require_admin<'a>(&self, session: &'a Value) -> Result<&'a Value, AuthError> {
        self.require_role(session, &self.admin_role)
    }

    /// The session issuer/verifier.
    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// The JWKS cache (health probes).
    pub fn jwks(&self) -> &JwksCache {
        self.verifier.jwks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_settings;
    use serde_json::json;

    #[test]
    fn require_role_uses_configured_path() {
        let service = AuthService::from_settings(&test_settings());
        let session = json!({"policy": ["admin", "user"]});

        service.require_role(&session, "user").unwrap();
        service.require_admin(&session).unwrap();
        assert!(service.require_role(&session, "root").is_err());
    }

    #[test]
    fn session_round_trip_through_service() {
        let service = AuthService::from_settings(&test_settings());
        let identity = json!({"sub": "u1", "preferred_username": "alice"});
        let credentials = crate::sts::StorageCredentials {
            access_key: "k".to_string(),
            secret_key: "s".to_string(),
            session_token: "t".to_string(),
            expiration: "e".to_string(),
        };

        let token = service.sessions().issue(&identity, &credentials).unwrap();
        let session = service.current_session(&token).unwrap();
        assert_eq!(session["sub"], "u1");
        assert_eq!(session["sts"]["access_key"], "k");
    }

    #[tokio::test]
    async fn authenticate_fails_fast_on_invalid_external_token() {
        // Verifier rejects before any STS traffic happens.
        let (url, _) = testutil::spawn_jwks_server().await;
        let mut settings = test_settings();
        settings.provider_url = url;
        let service = AuthService::from_settings(&settings);

        let result = service.authenticate("garbage").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
