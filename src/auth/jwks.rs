// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! The identity provider publishes its signing keys at the OpenID Connect
//! certs endpoint of the configured realm. Keys are cached with a 10 minute
//! TTL; a fetch failure propagates to the caller instead of serving a stale
//! set, so the caller decides whether to retry.
//!
//! The cache entry is guarded by an async `RwLock`: readers either see the
//! previous complete key set or the new one, never a partial write.
//! Concurrent callers that all observe an expired entry may each fetch; the
//! last writer wins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use super::error::AuthError;

/// JWKS cache TTL (10 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Timeout for a single JWKS fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Cached key set with its fetch instant.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// Caching client for the identity provider's key set.
#[derive(Clone)]
pub struct JwksCache {
    /// Realm certs endpoint, derived from provider URL + realm.
    jwks_url: String,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CacheEntry>>>,
    client: reqwest::Client,
}

impl JwksCache {
    /// Create a cache for `{provider_url}/realms/{realm}/protocol/openid-connect/certs`.
    pub fn new(provider_url: &str, realm: &str) -> Self {
        let jwks_url = format!(
            "{}/realms/{}/protocol/openid-connect/certs",
            provider_url.trim_end_matches('/'),
            realm
        );
        Self {
            jwks_url,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Override the cache TTL (tests).
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The resolved certs endpoint URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Return the cached key set, fetching a fresh one if expired or absent.
    pub async fn get_keys(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(CacheEntry {
                jwks: jwks.clone(),
                fetched_at: Instant::now(),
            });
        }

        Ok(jwks)
    }

    /// Fetch the key set from the provider.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksFetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))
    }

    /// Get a decoding key for the given key ID.
    pub async fn decoding_key(&self, kid: &str) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.get_keys().await?;

        let jwk = jwks
            .keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid))
            .ok_or(AuthError::NoMatchingKey)?;

        jwk_to_decoding_key(jwk)
    }

    /// Get any usable decoding key (for tokens without a `kid` header).
    pub async fn any_decoding_key(&self) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.get_keys().await?;

        for jwk in &jwks.keys {
            if let Ok(result) = jwk_to_decoding_key(jwk) {
                return Ok(result);
            }
        }

        Err(AuthError::NoMatchingKey)
    }

    /// Force refresh the cached key set.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let jwks = self.fetch_jwks().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    /// Whether a fresh key set is currently cached.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        if let Some(entry) = &*cache {
            entry.fetched_at.elapsed() < self.cache_ttl
        } else {
            false
        }
    }
}

/// Convert a JWK to a `DecodingKey`.
///
/// Only RSA keys are accepted; external tokens are verified with RS256-class
/// algorithms exclusively.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|e| AuthError::Internal(format!("Failed to create RSA key: {e}")))?;

            let alg = jwk
                .common
                .key_algorithm
                .map(|a| match a {
                    KeyAlgorithm::RS256 => Algorithm::RS256,
                    KeyAlgorithm::RS384 => Algorithm::RS384,
                    KeyAlgorithm::RS512 => Algorithm::RS512,
                    _ => Algorithm::RS256, // Default for RSA
                })
                .unwrap_or(Algorithm::RS256);

            Ok((key, alg))
        }
        _ => Err(AuthError::NoMatchingKey),
    }
}
