// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! STS federation against the object storage endpoint.
//!
//! Exchanges a verified external identity token for temporary storage
//! credentials with an `AssumeRoleWithWebIdentity` call. The response is
//! namespaced XML; the namespace is provider-defined and derived from the
//! root element rather than hardcoded, so MinIO-style and AWS-style
//! namespaces are both accepted.
//!
//! Failure taxonomy: an HTTP error status maps to `FederationRejected`
//! carrying the response body, a connection-level failure to
//! `ServiceUnavailable`, and a parseable response without a `Credentials`
//! element to `UnexpectedFederation`. No retries at this layer.

use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// Client-side timeout for the STS call.
const STS_TIMEOUT: Duration = Duration::from_secs(10);

/// Requested credential lifetime.
const STS_DURATION_SECONDS: &str = "3600";

/// STS protocol version.
const STS_VERSION: &str = "2011-06-15";

/// Temporary storage credentials returned by the STS exchange.
///
/// Opaque to the session layer: embedded into the session token as-is, never
/// interpreted or refreshed here.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: String,
    pub expiration: String,
}

impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Client for the storage endpoint's STS API.
#[derive(Debug, Clone)]
pub struct StsClient {
    endpoint_url: String,
    http: reqwest::Client,
}

impl StsClient {
    /// Create a client for `endpoint`, using HTTPS when `secure` is set.
    pub fn new(endpoint: &str, secure: bool) -> Self {
        let scheme = if secure { "https" } else { "http" };
        Self {
            endpoint_url: format!("{scheme}://{endpoint}"),
            http: reqwest::Client::builder()
                .timeout(STS_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// The resolved endpoint URL.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Exchange a verified external token for temporary storage credentials.
    pub async fn federate(&self, external_token: &str) -> Result<StorageCredentials, AuthError> {
        let params = [
            ("Action", "AssumeRoleWithWebIdentity"),
            ("Version", STS_VERSION),
            ("WebIdentityToken", external_token),
            ("DurationSeconds", STS_DURATION_SECONDS),
        ];

        let response = self
            .http
            .post(&self.endpoint_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = %status, "STS federation rejected");
            return Err(AuthError::FederationRejected(body));
        }

        parse_credentials(&body)
    }
}

/// Extract the `Credentials` element from an `AssumeRoleWithWebIdentity`
/// response.
///
/// The element and its fields must live in the namespace declared on the
/// root element (whatever the provider chose).
fn parse_credentials(body: &str) -> Result<StorageCredentials, AuthError> {
    let mut reader = NsReader::from_str(body);

    // Namespace of the document root, captured from the first start element.
    let mut root_ns: Option<Vec<u8>> = None;
    let mut in_credentials = false;
    let mut current_field: Option<String> = None;

    let mut access_key = None;
    let mut secret_key = None;
    let mut session_token = None;
    let mut expiration = None;

    loop {
        match reader.read_resolved_event() {
            Err(e) => {
                return Err(AuthError::UnexpectedFederation(format!(
                    "malformed STS XML: {e}"
                )))
            }
            Ok((ns, Event::Start(element))) => {
                let resolved = match ns {
                    ResolveResult::Bound(bound) => bound.as_ref().to_vec(),
                    _ => Vec::new(),
                };

                let Some(root) = &root_ns else {
                    root_ns = Some(resolved);
                    continue;
                };
                if &resolved != root {
                    continue;
                }

                if element.local_name().as_ref() == b"Credentials" {
                    in_credentials = true;
                } else if in_credentials {
                    current_field = Some(
                        String::from_utf8_lossy(element.local_name().as_ref()).into_owned(),
                    );
                }
            }
            Ok((_, Event::Text(text))) => {
                if let (true, Some(field)) = (in_credentials, current_field.as_deref()) {
                    let value = text
                        .unescape()
                        .map_err(|e| {
                            AuthError::UnexpectedFederation(format!("malformed STS XML: {e}"))
                        })?
                        .into_owned();
                    match field {
                        "AccessKeyId" => access_key = Some(value),
                        "SecretAccessKey" => secret_key = Some(value),
                        "SessionToken" => session_token = Some(value),
                        "Expiration" => expiration = Some(value),
                        _ => {}
                    }
                }
            }
            Ok((_, Event::End(element))) => {
                if element.local_name().as_ref() == b"Credentials" {
                    break;
                }
                current_field = None;
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
        }
    }

    match (access_key, secret_key, session_token, expiration) {
        (Some(access_key), Some(secret_key), Some(session_token), Some(expiration)) => {
            Ok(StorageCredentials {
                access_key,
                secret_key,
                session_token,
                expiration,
            })
        }
        _ if !in_credentials => Err(AuthError::UnexpectedFederation(
            "STS response missing Credentials element".to_string(),
        )),
        _ => Err(AuthError::UnexpectedFederation(
            "STS Credentials element missing required fields".to_string(),
        )),
    }
}
