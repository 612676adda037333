//! API Key generation
//!
//! Draws the prefix and secret halves of a bearer token from the OS RNG.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::domain::api_key::{BearerToken, PREFIX_LENGTH, SECRET_LENGTH};
use crate::domain::DomainError;

/// Freshly generated token halves (the secret is only shown once)
pub struct GeneratedApiKey {
    pub prefix: String,
    pub secret: String,
}

impl GeneratedApiKey {
    /// Full bearer token handed to the caller
    pub fn token(&self) -> String {
        BearerToken::format(&self.prefix, &self.secret)
    }
}

impl std::fmt::Debug for GeneratedApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedApiKey")
            .field("prefix", &self.prefix)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Generator for secure API keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    prefix_length: usize,
    secret_length: usize,
}

impl ApiKeyGenerator {
    pub fn new() -> Self {
        Self {
            prefix_length: PREFIX_LENGTH,
            secret_length: SECRET_LENGTH,
        }
    }

    /// Generate a new prefix/secret pair
    pub fn generate(&self) -> Result<GeneratedApiKey, DomainError> {
        let prefix = random_url_safe_string(self.prefix_length)?;
        let secret = random_url_safe_string(self.secret_length)?;

        Ok(GeneratedApiKey { prefix, secret })
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Random string of exactly `length` characters from the URL-safe base64 alphabet.
///
/// Reads `length` bytes from the OS RNG, encodes them without padding and keeps
/// the first `length` characters.
pub fn random_url_safe_string(length: usize) -> Result<String, DomainError> {
    let mut random_bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut random_bytes)
        .map_err(|e| DomainError::generation(format!("Failed to read random bytes: {}", e)))?;

    let mut encoded = URL_SAFE_NO_PAD.encode(&random_bytes);
    encoded.truncate(length);

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_url_safe(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    #[test]
    fn test_generate_key() {
        let generated = ApiKeyGenerator::new().generate().unwrap();

        assert_eq!(generated.prefix.len(), PREFIX_LENGTH);
        assert_eq!(generated.secret.len(), SECRET_LENGTH);
        assert!(is_url_safe(&generated.prefix));
        assert!(is_url_safe(&generated.secret));
    }

    #[test]
    fn test_token_format() {
        let generated = ApiKeyGenerator::new().generate().unwrap();
        let token = generated.token();

        assert_eq!(token.len(), PREFIX_LENGTH + 1 + SECRET_LENGTH);
        assert_eq!(token.matches('.').count(), 1);

        let parsed = BearerToken::parse(&token).unwrap();
        assert_eq!(parsed.prefix(), generated.prefix);
        assert_eq!(parsed.secret(), generated.secret);
    }

    #[test]
    fn test_random_string_lengths() {
        for length in [0, 1, 7, 32, 64] {
            let value = random_url_safe_string(length).unwrap();
            assert_eq!(value.len(), length);
            assert!(is_url_safe(&value));
        }
    }

    #[test]
    fn test_prefix_uniqueness() {
        let generator = ApiKeyGenerator::new();
        let mut seen = HashSet::new();

        for _ in 0..10_000 {
            let generated = generator.generate().unwrap();
            assert!(seen.insert(generated.prefix), "duplicate prefix generated");
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let generated = ApiKeyGenerator::new().generate().unwrap();
        let debug = format!("{:?}", generated);

        assert!(debug.contains(&generated.prefix));
        assert!(!debug.contains(&generated.secret));
    }
}
