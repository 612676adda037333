//! Secret hashing using Argon2

use argon2::{
    password_hash::{
        self, rand_core::OsRng, rand_core::RngCore, PasswordHash,
        PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;

use crate::domain::DomainError;

const SALT_BYTES: usize = 16;

/// Trait for one-way hashing of key secrets
pub trait SecretHasher: Send + Sync + Debug {
    /// Hash a secret into a self-describing (PHC) string
    fn hash(&self, secret: &str) -> Result<String, DomainError>;

    /// Verify a secret against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; a hash that cannot be parsed or checked is an error.
    fn verify(&self, secret: &str, hash: &str) -> Result<bool, DomainError>;
}

/// Argon2id hasher with fixed parameters (m = 19 MiB, t = 2, p = 1)
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }

    fn argon2() -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT)
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, DomainError> {
        let mut salt_bytes = [0u8; SALT_BYTES];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| DomainError::generation(format!("Failed to generate salt: {}", e)))?;

        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| DomainError::generation(format!("Failed to encode salt: {}", e)))?;

        Self::argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::generation(format!("Failed to hash secret: {}", e)))
    }

    fn verify(&self, secret: &str, hash: &str) -> Result<bool, DomainError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| DomainError::internal(format!("Stored hash is malformed: {}", e)))?;

        match Self::argon2().verify_password(secret.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(DomainError::internal(format!(
                "Failed to verify secret: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let secret = "0123456789abcdefghijklmnopqrstuv";

        let hash = hasher.hash(secret).unwrap();

        assert!(hasher.verify(secret, &hash).unwrap());
        assert!(!hasher.verify("wrong_secret", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hasher = Argon2Hasher::new();
        let secret = "0123456789abcdefghijklmnopqrstuv";

        let hash = hasher.hash(secret).unwrap();

        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert_ne!(hash, secret);
        assert!(!hash.contains(secret));
    }

    #[test]
    fn test_hash_is_unique() {
        let hasher = Argon2Hasher::new();
        let secret = "my_secure_secret";

        let hash1 = hasher.hash(secret).unwrap();
        let hash2 = hasher.hash(secret).unwrap();

        // Random salt
        assert_ne!(hash1, hash2);

        assert!(hasher.verify(secret, &hash1).unwrap());
        assert!(hasher.verify(secret, &hash2).unwrap());
    }

    #[test]
    fn test_hash_cannot_be_used_as_secret() {
        let hasher = Argon2Hasher::new();
        let secret = "my_secure_secret";

        let hash = hasher.hash(secret).unwrap();

        assert!(!hasher.verify(&hash, &hash).unwrap());
    }

    #[test]
    fn test_verify_malformed_hash() {
        let hasher = Argon2Hasher::new();

        assert!(matches!(
            hasher.verify("secret", "invalid_hash_format"),
            Err(DomainError::Internal { .. })
        ));
        assert!(matches!(
            hasher.verify("secret", ""),
            Err(DomainError::Internal { .. })
        ));
    }
}
