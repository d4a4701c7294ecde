// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Verification of the `Upstash-Signature` header on worker deliveries.
//!
//! The header is an HS256 JWT signed with the current or the next signing
//! key. Its `body` claim is the base64url SHA-256 of the raw request body.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use wacast_core::WacastError;

const ISSUER: &str = "Upstash";

/// The only claim checked outside [`Validation`].
#[derive(Debug, Deserialize)]
struct Claims {
    body: String,
}

/// Checks QStash signatures against a current and an optional next key.
#[derive(Clone)]
pub struct SignatureVerifier {
    current: String,
    next: Option<String>,
    validation: Validation,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("current", &"[redacted]")
            .field("next", &self.next.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn upstash_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss"]);
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation
}

impl SignatureVerifier {
    pub fn new(current: impl Into<String>, next: Option<String>) -> Self {
        Self {
            current: current.into(),
            next: next.filter(|k| !k.is_empty()),
            validation: upstash_validation(),
        }
    }

    /// Verifies `token` for `body`.
    ///
    /// The current key is tried first; on any failure the next key, if
    /// configured, gets a second attempt.
    pub fn verify(&self, token: &str, body: &[u8]) -> Result<(), WacastError> {
        match self.verify_with_key(&self.current, token, body) {
            Ok(()) => Ok(()),
            Err(first) => match &self.next {
                Some(next) => self.verify_with_key(next, token, body),
                None => Err(first),
            },
        }
    }

    fn verify_with_key(&self, key: &str, token: &str, body: &[u8]) -> Result<(), WacastError> {
        let data = decode::<Claims>(
            token.trim(),
            &DecodingKey::from_secret(key.as_bytes()),
            &self.validation,
        )
        .map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "token expired".to_string(),
                ErrorKind::ImmatureSignature => "token not yet valid".to_string(),
                ErrorKind::InvalidIssuer => "unexpected issuer".to_string(),
                ErrorKind::InvalidSignature => "signature mismatch".to_string(),
                ErrorKind::InvalidAlgorithm => "unexpected signing algorithm".to_string(),
                _ => format!("malformed signature token: {e}"),
            };
            WacastError::Unauthorized(reason)
        })?;

        let digest = URL_SAFE_NO_PAD.encode(Sha256::digest(body));
        if data.claims.body.trim_end_matches('=') != digest {
            return Err(WacastError::Unauthorized("body hash mismatch".into()));
        }
        Ok(())
    }
}
