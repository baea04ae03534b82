// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! Internal session token issuance and verification.
//!
//! After the external token is verified and federated, the gateway mints a
//! self-contained HS256 token bundling identity claims, storage credentials
//! and the configured role claim. Subsequent requests present this token
//! instead of re-authenticating with the identity provider.
//!
//! A token's life is `issued -> valid (while now < exp and the signature
//! checks) -> expired`. There is no revocation list; expiry is the only
//! invalidation mechanism, and the token itself is the only record — nothing
//! is stored server-side.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};

use super::claims::{extract_claim, reconstruct_claim};
use super::error::AuthError;
use crate::sts::StorageCredentials;

/// `type` discriminator stamped into every session payload.
pub const SESSION_TYPE: &str = "stowgate_session";

/// Fixed path of the provider's realm roles, independent of the configurable
/// role-claim path.
const REALM_ROLES_PATH: &str = "realm_access.roles";

/// Issues and verifies internal session tokens.
#[derive(Clone)]
pub struct SessionService {
    secret: String,
    lifetime_minutes: i64,
    role_claim_path: String,
}

impl SessionService {
    pub fn new(
        secret: impl Into<String>,
        lifetime_minutes: i64,
        role_claim_path: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            lifetime_minutes,
            role_claim_path: role_claim_path.into(),
        }
    }

    /// Session lifetime in minutes.
    pub fn lifetime_minutes(&self) -> i64 {
        self.lifetime_minutes
    }

    /// Build and sign a session token from verified identity claims and
    /// freshly federated storage credentials.
    ///
    /// The payload carries `sub`, `username` (`preferred_username`), a
    /// flattened `roles` list from the fixed `realm_access.roles` path, the
    /// full credentials under `sts`, the `type` discriminator and `exp`. The
    /// configured role claim is then merged back in at its original nested
    /// location, so it round-trips through the session transparently.
    /// Configuration validation guarantees its first path segment cannot
    /// collide with the reserved fields above.
    pub fn issue(
        &self,
        identity_claims: &Value,
        credentials: &StorageCredentials,
    ) -> Result<String, AuthError> {
        let expire = Utc::now() + Duration::minutes(self.lifetime_minutes);

        let mut payload = Map::new();
        payload.insert(
            "sub".to_string(),
            identity_claims.get("sub").cloned().unwrap_or(Value::Null),
        );
        payload.insert(
            "username".to_string(),
            identity_claims
                .get("preferred_username")
                .cloned()
                .unwrap_or(Value::Null),
        );
        payload.insert(
            "roles".to_string(),
            extract_claim(identity_claims, REALM_ROLES_PATH)
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new())),
        );
        payload.insert(
            "sts".to_string(),
            serde_json::to_value(credentials)
                .map_err(|e| AuthError::Internal(format!("credential serialization: {e}")))?,
        );
        payload.insert("type".to_string(), Value::String(SESSION_TYPE.to_string()));
        payload.insert("exp".to_string(), Value::from(expire.timestamp()));

        // Round-trip the configured role claim at its original location.
        if let Value::Object(claim) = reconstruct_claim(identity_claims, &self.role_claim_path) {
            for (key, value) in claim {
                payload.insert(key, value);
            }
        }

        encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("session signing: {e}")))
    }

    /// Decode a session token, checking signature and expiry.
    ///
    /// Internally-issued tokens carry no audience or issuer, so only the
    /// signature and `exp` are validated.
    pub fn verify(&self, token: &str) -> Result<Value, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        let token_data = decode::<Value>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
            AuthError::InvalidToken
        })?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("secret", &"[REDACTED]")
            .field("lifetime_minutes", &self.lifetime_minutes)
            .field("role_claim_path", &self.role_claim_path)
            .finish()
    }
}
