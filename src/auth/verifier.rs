// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! External identity token verification.
//!
//! Validates provider-issued RS256 JWTs against the cached JWKS: signature,
//! expiry and audience (must equal the configured client id). Every
//! validation failure collapses into [`AuthError::InvalidToken`]; the caller
//! only learns that the token was rejected, the cause is logged at debug.

use jsonwebtoken::{decode, decode_header, Validation};
use serde_json::Value;

use super::error::AuthError;
use super::jwks::JwksCache;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Verifier for externally-issued identity tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    jwks: JwksCache,
    audience: String,
}

impl TokenVerifier {
    /// Create a verifier expecting tokens issued for `audience` (the
    /// configured client id), keyed by the given JWKS cache.
    pub fn new(jwks: JwksCache, audience: impl Into<String>) -> Self {
        Self {
            jwks,
            audience: audience.into(),
        }
    }

    /// The key cache backing this verifier (shared, for health probes).
    pub fn jwks(&self) -> &JwksCache {
        &self.jwks
    }

    /// Verify an external token and return its decoded claims.
    ///
    /// A JWKS fetch failure surfaces as [`AuthError::JwksFetch`]; every token
    /// validation failure is [`AuthError::InvalidToken`].
    pub async fn verify(&self, token: &str) -> Result<Value, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "malformed external token header");
            AuthError::InvalidToken
        })?;

        let (decoding_key, algorithm) = match &header.kid {
            Some(kid) => self.jwks.decoding_key(kid).await?,
            // No kid in the header, try any usable key.
            None => self.jwks.any_decoding_key().await?,
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Value>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "external token rejected");
            AuthError::InvalidToken
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testutil::{sign_external_token, spawn_jwks_server};
    use serde_json::json;

    const AUDIENCE: &str = "storage-console";

    fn sample_claims() -> Value {
        json!({
            "sub": "user-1",
            "preferred_username": "alice",
            "aud": AUDIENCE,
            "exp": chrono::Utc::now().timestamp() + 300,
            "realm_access": {"roles": ["admin", "user"]},
            "policy": ["readwrite"]
        })
    }

    async fn test_verifier() -> TokenVerifier {
        let (url, _) = spawn_jwks_server().await;
        TokenVerifier::new(JwksCache::new(&url, "test"), AUDIENCE)
    }

    #[tokio::test]
    async fn valid_token_returns_claims() {
        let verifier = test_verifier().await;
        let token = sign_external_token(&sample_claims());

        let claims = verifier.verify(&token).await.unwrap();
        assert_eq!(claims["sub"], "user-1");
        assert_eq!(claims["preferred_username"], "alice");
        assert_eq!(claims["realm_access"]["roles"], json!(["admin", "user"]));
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let verifier = test_verifier().await;
        let mut claims = sample_claims();
        claims["aud"] = json!("some-other-client");
        let token = sign_external_token(&claims);

        let result = verifier.verify(&token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let verifier = test_verifier().await;
        let mut claims = sample_claims();
        // Well past the 60s leeway.
        claims["exp"] = json!(chrono::Utc::now().timestamp() - 3600);
        let token = sign_external_token(&claims);

        let result = verifier.verify(&token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn tampered_signature_is_rejected() {
        let verifier = test_verifier().await;
        let token = sign_external_token(&sample_claims());

        // Flip a character in the signature segment.
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let sig = parts[2].clone();
        parts[2] = if sig.starts_with('A') {
            format!("B{}", &sig[1..])
        } else {
            format!("A{}", &sig[1..])
        };
        let tampered = parts.join(".");

        let result = verifier.verify(&tampered).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let verifier = test_verifier().await;
        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn jwks_outage_surfaces_as_fetch_error() {
        let verifier = TokenVerifier::new(JwksCache::new("http://127.0.0.1:9", "test"), AUDIENCE);
        let token = sign_external_token(&sample_claims());

        let result = verifier.verify(&token).await;
        assert!(matches!(result, Err(AuthError::JwksFetch(_))));
    }
}
