//! Signed, time-limited email confirmation tokens.
//!
//! Token layout (all parts base64url without padding, joined by `.`):
//!
//! ```text
//! email . issued_at (u64, big endian, unix seconds) . HMAC-SHA256(key, "email-confirm:" + email "." issued_at)
//! ```
//!
//! The signing key is the session secret.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use papeleria_core::Email;

/// Domain separation prefix mixed into every signature.
const SALT: &str = "email-confirm";

/// Tokens older than this are rejected.
pub const MAX_AGE_SECS: u64 = 3600;

/// Why a token was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong shape or undecodable parts.
    #[error("malformed token")]
    Malformed,
    /// Signature does not match.
    #[error("bad signature")]
    BadSignature,
    /// Signature is valid but the token is too old.
    #[error("token expired")]
    Expired,
}

/// Issues and verifies confirmation tokens.
#[derive(Clone)]
pub struct ConfirmationTokens {
    keyed: Hmac<Sha256>,
}

impl ConfirmationTokens {
    /// Create a signer keyed with `key`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLength` if the key is rejected by HMAC.
    pub fn new(key: &SecretString) -> Result<Self, InvalidLength> {
        let keyed = <Hmac<Sha256> as Mac>::new_from_slice(key.expose_secret().as_bytes())?;
        Ok(Self { keyed })
    }

    /// Issue a token for `email`, timestamped now.
    #[must_use]
    pub fn generate(&self, email: &Email) -> String {
        self.generate_at(email, now_secs())
    }

    /// Verify a token and return the email it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if the token is malformed, forged or older than
    /// [`MAX_AGE_SECS`].
    pub fn verify(&self, token: &str) -> Result<Email, TokenError> {
        self.verify_at(token, now_secs())
    }

    fn generate_at(&self, email: &Email, issued_at: u64) -> String {
        let payload = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(email.as_str()),
            URL_SAFE_NO_PAD.encode(issued_at.to_be_bytes())
        );
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&payload));
        format!("{payload}.{signature}")
    }

    fn verify_at(&self, token: &str, now: u64) -> Result<Email, TokenError> {
        let (payload, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (email_part, issued_part) = payload.split_once('.').ok_or(TokenError::Malformed)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        self.mac(payload)
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let issued_bytes: [u8; 8] = URL_SAFE_NO_PAD
            .decode(issued_part)
            .map_err(|_| TokenError::Malformed)?
            .try_into()
            .map_err(|_| TokenError::Malformed)?;
        let issued_at = u64::from_be_bytes(issued_bytes);
        if now.saturating_sub(issued_at) > MAX_AGE_SECS {
            return Err(TokenError::Expired);
        }

        let email_bytes = URL_SAFE_NO_PAD
            .decode(email_part)
            .map_err(|_| TokenError::Malformed)?;
        let email = String::from_utf8(email_bytes).map_err(|_| TokenError::Malformed)?;
        Email::parse(&email).map_err(|_| TokenError::Malformed)
    }

    fn mac(&self, payload: &str) -> Hmac<Sha256> {
        let mut mac = self.keyed.clone();
        mac.update(SALT.as_bytes());
        mac.update(b":");
        mac.update(payload.as_bytes());
        mac
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        self.mac(payload).finalize().into_bytes().to_vec()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tokens(key: &str) -> ConfirmationTokens {
        ConfirmationTokens::new(&SecretString::from(key.to_owned())).unwrap()
    }

    fn email() -> Email {
        Email::parse("ana@example.com").unwrap()
    }

    #[test]
    fn test_token_verifies_within_max_age() {
        let signer = tokens("k3y-For-Tests-9f8e7d6c5b4a3210-ZyXw");
        let token = signer.generate_at(&email(), 1_000);

        assert_eq!(signer.verify_at(&token, 1_000).unwrap(), email());
        assert_eq!(signer.verify_at(&token, 1_000 + MAX_AGE_SECS).unwrap(), email());
    }

    #[test]
    fn test_token_expires() {
        let signer = tokens("k3y-For-Tests-9f8e7d6c5b4a3210-ZyXw");
        let token = signer.generate_at(&email(), 1_000);

        assert_eq!(
            signer.verify_at(&token, 1_001 + MAX_AGE_SECS),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_token_from_other_key_rejected() {
        let token = tokens("first-Key-aaaa-1111-bbbb-2222-cccc").generate_at(&email(), 1_000);
        let other = tokens("second-Key-dddd-3333-eeee-4444-ffff");

        assert_eq!(other.verify_at(&token, 1_000), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_email_rejected() {
        let signer = tokens("k3y-For-Tests-9f8e7d6c5b4a3210-ZyXw");
        let token = signer.generate_at(&email(), 1_000);
        let (_, rest) = token.split_once('.').unwrap();
        let forged = format!("{}.{rest}", URL_SAFE_NO_PAD.encode("eve@example.com"));

        assert_eq!(signer.verify_at(&forged, 1_000), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_malformed_tokens() {
        let signer = tokens("k3y-For-Tests-9f8e7d6c5b4a3210-ZyXw");

        assert_eq!(signer.verify_at("", 0), Err(TokenError::Malformed));
        assert_eq!(signer.verify_at("abc", 0), Err(TokenError::Malformed));
        assert_eq!(signer.verify_at("a.b.!!!", 0), Err(TokenError::Malformed));
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = tokens("k3y-For-Tests-9f8e7d6c5b4a3210-ZyXw").generate(&email());

        assert_eq!(token.matches('.').count(), 2);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        );
    }
}
