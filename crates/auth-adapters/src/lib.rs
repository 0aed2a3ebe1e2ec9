//! # auth-adapters
//!
//! Credential hashing and session token adapters for the `domains` ports.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenCodec;

use thiserror::Error;

/// Raised while constructing an adapter from configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthSetupError {
    #[error("jwt secret must be at least {min} characters")]
    SecretTooShort { min: usize },

    #[error("token lifetime must be positive")]
    InvalidTtl,
}
