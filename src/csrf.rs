//! Signed CSRF tokens for the HTML forms.
//!
//! Token format: `<expires>.<nonce>.<signature>` where `expires` is a Unix
//! timestamp, `nonce` a random UUID, and `signature` the hex HMAC-SHA256 of
//! `"<expires>.<nonce>"` under the server secret. Tokens are stateless: any
//! unexpired token signed with the current key is accepted.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::config::ServerConfig;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of an issued token.
pub const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Error, PartialEq)]
pub enum CsrfError {
    #[error("The CSRF token is missing.")]
    Missing,
    #[error("The CSRF token is malformed.")]
    Malformed,
    #[error("The CSRF token has expired.")]
    Expired,
    #[error("The CSRF token is invalid.")]
    BadSignature,
}

#[derive(Clone)]
pub struct CsrfGuard {
    key: Vec<u8>,
    enabled: bool,
}

impl CsrfGuard {
    pub fn new(secret: &[u8], enabled: bool) -> Self {
        Self {
            key: secret.to_vec(),
            enabled,
        }
    }

    /// Use `server.secret_key`, or 32 random bytes when none is configured.
    pub fn from_config(server: &ServerConfig) -> Self {
        match &server.secret_key {
            Some(secret) => Self::new(secret.as_bytes(), server.csrf),
            None => {
                let mut key = uuid::Uuid::new_v4().as_bytes().to_vec();
                key.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
                Self::new(&key, server.csrf)
            }
        }
    }

    pub fn issue(&self) -> String {
        self.issue_at(Utc::now().timestamp())
    }

    fn issue_at(&self, now: i64) -> String {
        let payload = format!("{}.{}", now + TOKEN_TTL_SECS, uuid::Uuid::new_v4().simple());
        let signature = hex::encode(self.mac(&payload).finalize().into_bytes());
        format!("{}.{}", payload, signature)
    }

    /// Always `Ok` when the guard is disabled.
    pub fn verify(&self, token: &str) -> Result<(), CsrfError> {
        if !self.enabled {
            return Ok(());
        }
        self.verify_at(token, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<(), CsrfError> {
        if token.is_empty() {
            return Err(CsrfError::Missing);
        }

        let (payload, signature) = token.rsplit_once('.').ok_or(CsrfError::Malformed)?;
        let (expires, _nonce) = payload.split_once('.').ok_or(CsrfError::Malformed)?;
        let expires: i64 = expires.parse().map_err(|_| CsrfError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| CsrfError::Malformed)?;

        self.mac(payload)
            .verify_slice(&signature)
            .map_err(|_| CsrfError::BadSignature)?;

        if now > expires {
            return Err(CsrfError::Expired);
        }
        Ok(())
    }

    fn mac(&self, payload: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> CsrfGuard {
        CsrfGuard::new(b"test-secret", true)
    }

    #[test]
    fn test_issued_token_verifies() {
        let g = guard();
        assert_eq!(g.verify(&g.issue()), Ok(()));
    }

    #[test]
    fn test_empty_token_is_missing() {
        assert_eq!(guard().verify(""), Err(CsrfError::Missing));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(guard().verify("nonsense"), Err(CsrfError::Malformed));
        assert_eq!(guard().verify("abc.def.zz"), Err(CsrfError::Malformed));
    }

    #[test]
    fn test_other_key_is_rejected() {
        let token = CsrfGuard::new(b"other-secret", true).issue();
        assert_eq!(guard().verify(&token), Err(CsrfError::BadSignature));
    }

    #[test]
    fn test_tampered_expiry_is_rejected() {
        let g = guard();
        let token = g.issue_at(1_000);
        let tampered = token.replacen(&(1_000 + TOKEN_TTL_SECS).to_string(), "99999999999", 1);
        assert_eq!(g.verify(&tampered), Err(CsrfError::BadSignature));
    }

    #[test]
    fn test_expired_token() {
        let g = guard();
        let token = g.issue_at(1_000);
        assert_eq!(g.verify_at(&token, 1_000 + TOKEN_TTL_SECS), Ok(()));
        assert_eq!(
            g.verify_at(&token, 1_001 + TOKEN_TTL_SECS),
            Err(CsrfError::Expired)
        );
    }

    #[test]
    fn test_disabled_guard_accepts_anything() {
        let g = CsrfGuard::new(b"k", false);
        assert_eq!(g.verify(""), Ok(()));
    }

    #[test]
    fn test_random_keys_differ() {
        let server = ServerConfig {
            bind: "127.0.0.1:0".to_string(),
            secret_key: None,
            csrf: true,
        };
        let a = CsrfGuard::from_config(&server);
        let b = CsrfGuard::from_config(&server);
        assert_eq!(b.verify(&a.issue()), Err(CsrfError::BadSignature));
    }
}
