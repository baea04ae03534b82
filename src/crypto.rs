// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

//! Authenticated payload encryption with per-token key derivation.
//!
//! Standalone cryptographic utility: encrypts an arbitrary JSON payload under
//! a key derived from the process master secret and a caller-supplied token
//! string. The derived key exists only for the duration of a single operation.
//!
//! ## Wire Format
//!
//! `base64(nonce ‖ ciphertext ‖ tag)` with a 12-byte random nonce and the
//! 16-byte GCM authentication tag appended by the cipher.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Nonce length in bytes (96 bits).
const NONCE_LENGTH: usize = 12;

/// Authentication tag length in bytes (128 bits).
const TAG_LENGTH: usize = 16;

/// Error type for payload cipher operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Payload could not be serialized or encrypted.
    #[error("payload encryption failed")]
    Encryption,

    /// Input is malformed or the authentication tag did not verify
    /// (wrong token or tampered ciphertext).
    #[error("payload decryption failed")]
    Decryption,
}

/// Symmetric payload cipher bound to a master secret.
#[derive(Clone)]
pub struct PayloadCipher {
    secret: String,
}

impl PayloadCipher {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Derive a 256-bit key from `master_secret ++ token`.
    ///
    /// One-way hash; the key is recomputed on every operation and never
    /// stored.
    fn derive_key(&self, token: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(token.as_bytes());
        hasher.finalize().into()
    }

    /// Encrypt a JSON payload under the key derived from `token`.
    ///
    /// A fresh random nonce is generated per call, so two encryptions of the
    /// same payload produce different outputs.
    pub fn encrypt(&self, payload: &Value, token: &str) -> Result<String, CryptoError> {
        let key = self.derive_key(token);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let data = serde_json::to_vec(payload).map_err(|_| CryptoError::Encryption)?;

        let ciphertext = cipher
            .encrypt(&nonce, data.as_ref())
            .map_err(|_| CryptoError::Encryption)?;

        let mut combined = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(combined))
    }

    /// Decrypt a payload previously produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails with [`CryptoError::Decryption`] if `token` differs from the one
    /// used to encrypt or the input is malformed.
    pub fn decrypt(&self, encoded: &str, token: &str) -> Result<Value, CryptoError> {
        let key = self.derive_key(token);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        let combined = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::Decryption)?;

        if combined.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CryptoError::Decryption);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LENGTH);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::Decryption)?;

        serde_json::from_slice(&plaintext).map_err(|_| CryptoError::Decryption)
    }
}

impl std::fmt::Debug for PayloadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCipher")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
