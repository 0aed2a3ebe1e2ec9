//! Password hashing and verification using Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use domains::{CredentialHasher, DomainError, Result};

/// Produces PHC strings that embed the salt and parameters.
#[derive(Default, Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("failed to hash password: {e}")))
    }

    /// A stored value that is not a PHC string is an infrastructure fault, not a wrong password.
    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| DomainError::internal(format!("invalid password hash format: {e}")))?;
        Ok(self.argon2.verify_password(password.as_bytes(), &parsed).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("kampanya-2024").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("kampanya-2024", &hash).unwrap());
        assert!(!hasher.verify("kampanya-2025", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = Argon2Hasher::new();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_internal() {
        let err = Argon2Hasher::new().verify("pw", "plaintext").unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
