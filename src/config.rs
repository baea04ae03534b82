// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `OIDC_PROVIDER_URL` | Identity provider base URL | Required |
//! | `OIDC_REALM` | Identity provider realm | Required |
//! | `OIDC_CLIENT_ID` | Client id; expected token audience | Required |
//! | `OIDC_CLIENT_SECRET` | Client secret | Required |
//! | `STORAGE_ENDPOINT` | Object storage endpoint (`host:port`) | Required |
//! | `STORAGE_SECURE` | Use HTTPS towards the storage endpoint | `false` |
//! | `ROLE_CLAIM_PATH` | Dotted path of the role claim | `policy` |
//! | `ADMIN_ROLE` | Role name granting admin access | Required |
//! | `SESSION_SECRET` | Internal session signing secret | Required |
//! | `SESSION_EXP_MINUTES` | Session token lifetime in minutes | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

/// Session payload fields that the issuer reserves for itself. A role-claim
/// path whose first segment collides with one of these would let the merged
/// claim silently overwrite it, so such configurations are rejected.
pub const RESERVED_SESSION_FIELDS: [&str; 6] = ["sub", "username", "roles", "sts", "type", "exp"];

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {var}: {message}")]
    InvalidVar { var: String, message: String },

    #[error("role claim path '{0}' collides with a reserved session field")]
    ReservedClaimPath(String),
}

/// Recognized configuration surface.
#[derive(Clone)]
pub struct Settings {
    /// Identity provider base URL.
    pub provider_url: String,
    /// Identity provider realm.
    pub realm: String,
    /// Client id; external tokens must carry it as their audience.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Object storage endpoint (`host:port`).
    pub storage_endpoint: String,
    /// Whether to use HTTPS towards the storage endpoint.
    pub storage_secure: bool,
    /// Dotted path of the configurable role claim.
    pub role_claim_path: String,
    /// Role name granting admin access.
    pub admin_role: String,
    /// Internal session signing secret.
    pub session_secret: String,
    /// Session token lifetime in minutes.
    pub session_exp_minutes: i64,
    /// Server bind address.
    pub host: String,
    /// Server bind port.
    pub port: u16,
}

impl Settings {
    /// Load and validate settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Self {
            provider_url: env_required("OIDC_PROVIDER_URL")?,
            realm: env_required("OIDC_REALM")?,
            client_id: env_required("OIDC_CLIENT_ID")?,
            client_secret: env_required("OIDC_CLIENT_SECRET")?,
            storage_endpoint: env_required("STORAGE_ENDPOINT")?,
            storage_secure: env_or_default("STORAGE_SECURE", "false")
                .parse()
                .map_err(|_| ConfigError::InvalidVar {
                    var: "STORAGE_SECURE".to_string(),
                    message: "expected 'true' or 'false'".to_string(),
                })?,
            role_claim_path: env_or_default("ROLE_CLAIM_PATH", "policy"),
            admin_role: env_required("ADMIN_ROLE")?,
            session_secret: env_required("SESSION_SECRET")?,
            session_exp_minutes: env_required("SESSION_EXP_MINUTES")?
                .parse()
                .map_err(|_| ConfigError::InvalidVar {
                    var: "SESSION_EXP_MINUTES".to_string(),
                    message: "expected an integer number of minutes".to_string(),
                })?,
            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "8080")
                .parse()
                .map_err(|_| ConfigError::InvalidVar {
                    var: "PORT".to_string(),
                    message: "expected a port number".to_string(),
                })?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let first_segment = self
            .role_claim_path
            .split('.')
            .next()
            .unwrap_or(&self.role_claim_path);
        if RESERVED_SESSION_FIELDS.contains(&first_segment) {
            return Err(ConfigError::ReservedClaimPath(self.role_claim_path.clone()));
        }

        if self.session_exp_minutes <= 0 {
            return Err(ConfigError::InvalidVar {
                var: "SESSION_EXP_MINUTES".to_string(),
                message: "must be positive".to_string(),
            });
        }

        Ok(())
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("provider_url", &self.provider_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("storage_endpoint", &self.storage_endpoint)
            .field("storage_secure", &self.storage_secure)
            .field("role_claim_path", &self.role_claim_path)
            .field("admin_role", &self.admin_role)
            .field("session_secret", &"[REDACTED]")
            .field("session_exp_minutes", &self.session_exp_minutes)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

fn env_required(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Baseline settings for tests; endpoints point at closed local ports.
#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        provider_url: "http://127.0.0.1:1".to_string(),
        realm: "storage".to_string(),
        client_id: "storage-console".to_string(),
        client_secret: "client-secret".to_string(),
        storage_endpoint: "127.0.0.1:9000".to_string(),
        storage_secure: false,
        role_claim_path: "policy".to_string(),
        admin_role: "admin".to_string(),
        session_secret: "internal-secret".to_string(),
        session_exp_minutes: 30,
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}
