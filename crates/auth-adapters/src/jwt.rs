//! # JWT Token Codec
//!
//! HS256 session tokens. The payload carries the account id (`sub`) and an
//! `is_admin` snapshot for the client; authorization never reads the snapshot.
//! Expiry is checked with zero leeway.

use chrono::Utc;
use domains::{DomainError, Result, TokenClaims, TokenCodec};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::AuthSetupError;

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    is_admin: bool,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtTokenCodec {
    pub fn new(secret: &SecretString, ttl_secs: i64) -> std::result::Result<Self, AuthSetupError> {
        let raw = secret.expose_secret();
        if raw.len() < MIN_SECRET_LEN {
            return Err(AuthSetupError::SecretTooShort { min: MIN_SECRET_LEN });
        }
        if ttl_secs <= 0 {
            return Err(AuthSetupError::InvalidTtl);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(raw.as_bytes()),
            decoding: DecodingKey::from_secret(raw.as_bytes()),
            validation,
            ttl_secs,
        })
    }

    /// Issues a token as if it had been signed at `issued_at` (unix seconds).
    pub fn issue_at(&self, account_id: Uuid, is_admin: bool, issued_at: i64) -> Result<String> {
        let claims = Claims {
            sub: account_id,
            is_admin,
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("failed to sign token: {e}")))
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, account_id: Uuid, is_admin: bool) -> Result<String> {
        self.issue_at(account_id, is_admin, Utc::now().timestamp())
    }

    fn verify(&self, token: &str) -> Result<TokenClaims> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(TokenClaims {
                account_id: data.claims.sub,
                is_admin: data.claims.is_admin,
                issued_at: data.claims.iat,
                expires_at: data.claims.exp,
            }),
            Err(err) => {
                let reason = match err.kind() {
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidSignature => "bad signature",
                    ErrorKind::InvalidToken => "malformed",
                    _ => "rejected",
                };
                debug!(reason, "token verification failed");
                Err(DomainError::Unauthenticated("Invalid token".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-0123456789";

    fn codec() -> JwtTokenCodec {
        JwtTokenCodec::new(&SecretString::from(SECRET), 3600).unwrap()
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = JwtTokenCodec::new(&SecretString::from("short"), 3600).err();
        assert_eq!(err, Some(AuthSetupError::SecretTooShort { min: MIN_SECRET_LEN }));
    }

    #[test]
    fn test_issue_and_verify() {
        let id = Uuid::now_v7();
        let token = codec().issue(id, true).unwrap();
        let claims = codec().verify(&token).unwrap();

        assert_eq!(claims.account_id, id);
        assert!(claims.is_admin);
        assert_eq!(claims.expires_at - claims.issued_at, 3600);
    }

    #[test]
    fn test_expired_token() {
        let two_hours_ago = Utc::now().timestamp() - 7200;
        let token = codec().issue_at(Uuid::now_v7(), false, two_hours_ago).unwrap();
        let err = codec().verify(&token).unwrap_err();
        assert_eq!(err, DomainError::Unauthenticated("Invalid token".into()));
    }

    #[test]
    fn test_foreign_signature() {
        let other = JwtTokenCodec::new(&SecretString::from("another-secret-also-long-enough-abcdefgh"), 3600).unwrap();
        let token = other.issue(Uuid::now_v7(), false).unwrap();
        assert!(matches!(codec().verify(&token), Err(DomainError::Unauthenticated(_))));
    }

    #[test]
    fn test_garbage_token() {
        assert!(codec().verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_payload_field_names() {
        let token = codec().issue(Uuid::nil(), false).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        // base64url of `{"sub":` is stable regardless of the values that follow
        assert!(payload.starts_with("eyJzdWIiOi"));
    }
}
