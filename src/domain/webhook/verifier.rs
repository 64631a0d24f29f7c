//! Webhook signature verification.
//!
//! The sender signs the exact raw request body with HMAC-SHA256 using the
//! shared webhook secret and sends the base64 digest in a header. The digest
//! must be computed over the bytes as received; re-serialising parsed JSON
//! does not reproduce them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Default header carrying the base64 HMAC.
pub const DEFAULT_SIGNATURE_HEADER: &str = "x-shopify-hmac-sha256";

/// Computes the base64 HMAC-SHA256 of `body` under `secret`.
pub fn compute_signature(secret: &[u8], body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verifies a webhook signature.
///
/// Fails closed: an empty body, a missing or blank header, or a missing or
/// empty secret all return `false`.
pub fn verify(raw_body: &[u8], signature_header: Option<&str>, secret: Option<&str>) -> bool {
    let (Some(header), Some(secret)) = (signature_header, secret) else {
        return false;
    };
    let header = header.trim();
    if raw_body.is_empty() || header.is_empty() || secret.is_empty() {
        return false;
    }

    let Some(expected) = compute_signature(secret.as_bytes(), raw_body) else {
        return false;
    };
    constant_time_compare(expected.as_bytes(), header.as_bytes())
}

/// Verifier bound to the configured webhook secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Option<SecretString>,
}

impl SignatureVerifier {
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    pub fn is_configured(&self) -> bool {
        self.secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty())
    }

    /// # Errors
    ///
    /// Returns `WebhookError::InvalidSignature` when [`verify`] fails.
    pub fn verify(&self, raw_body: &[u8], signature_header: Option<&str>) -> Result<(), WebhookError> {
        let secret = self.secret.as_ref().map(|s| s.expose_secret().as_str());
        if verify(raw_body, signature_header, secret) {
            Ok(())
        } else {
            if !self.is_configured() {
                tracing::error!("Webhook secret is not configured; rejecting delivery");
            } else {
                tracing::warn!(
                    header_present = signature_header.is_some(),
                    body_len = raw_body.len(),
                    "Webhook signature verification failed"
                );
            }
            Err(WebhookError::InvalidSignature)
        }
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.ct_eq(b).into()
}
