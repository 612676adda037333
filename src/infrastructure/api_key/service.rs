//! API Key service
//!
//! Issues, looks up, expires, destroys and validates API keys.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, BearerToken, NewApiKey};
use crate::domain::DomainError;

use super::generator::ApiKeyGenerator;
use super::hasher::{Argon2Hasher, SecretHasher};
use super::override_key::OverrideKey;

/// Result of creating a new API key
pub struct CreateApiKeyResult {
    /// The persisted record (contains no secret material)
    pub api_key: ApiKey,
    /// The full bearer token, only returned once
    pub token: String,
}

impl std::fmt::Debug for CreateApiKeyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateApiKeyResult")
            .field("api_key", &self.api_key)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// API Key service for managing API keys
pub struct ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    repository: Arc<R>,
    generator: ApiKeyGenerator,
    hasher: Arc<dyn SecretHasher>,
    override_key: Option<OverrideKey>,
}

impl<R: ApiKeyRepository> ApiKeyService<R> {
    /// Create a new API key service
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::new(),
            hasher: Arc::new(Argon2Hasher::new()),
            override_key: None,
        }
    }

    /// Accept a static override token; empty disables it
    pub fn with_override_key(mut self, override_key: Option<&str>) -> Self {
        self.override_key = OverrideKey::from_config(override_key);
        self
    }

    /// Create with a custom hasher
    pub fn with_hasher(mut self, hasher: Arc<dyn SecretHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Issue a new API key
    pub async fn create(
        &self,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<CreateApiKeyResult, DomainError> {
        let generated = self.generator.generate()?;
        let hash = self.hash_secret(generated.secret.clone()).await?;

        let api_key = self
            .repository
            .create(NewApiKey::new(&generated.prefix, hash, expiration))
            .await?;

        info!(
            id = %api_key.id(),
            prefix = %api_key.prefix(),
            expiration = ?api_key.expiration(),
            "API key created"
        );

        Ok(CreateApiKeyResult {
            api_key,
            token: generated.token(),
        })
    }

    /// List all API keys, expired or not
    pub async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        self.repository.list().await
    }

    /// Get an API key by ID
    pub async fn get(&self, id: ApiKeyId) -> Result<ApiKey, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("API key '{}' not found", id)))
    }

    /// Get an API key by prefix
    pub async fn get_by_prefix(&self, prefix: &str) -> Result<ApiKey, DomainError> {
        self.repository
            .get_by_prefix(prefix)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("API key with prefix '{}' not found", prefix))
            })
    }

    /// Permanently delete an API key. Deleting an absent key is a no-op.
    pub async fn destroy(&self, api_key: &ApiKey) -> Result<(), DomainError> {
        if self.repository.delete(api_key.id()).await? {
            info!(id = %api_key.id(), prefix = %api_key.prefix(), "API key destroyed");
        } else {
            debug!(id = %api_key.id(), "API key already absent, nothing to destroy");
        }

        Ok(())
    }

    /// Expire an API key now; it stays listable until destroyed
    pub async fn expire(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        let expired = self
            .repository
            .set_expiration(api_key.id(), Some(Utc::now()))
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("API key '{}' not found", api_key.id()))
            })?;

        info!(id = %expired.id(), prefix = %expired.prefix(), "API key expired");

        Ok(expired)
    }

    /// Check that the key store is reachable
    pub async fn health_check(&self) -> Result<bool, DomainError> {
        self.repository.health_check().await
    }

    /// Validate a presented bearer token.
    ///
    /// `Ok(false)` covers expired keys and wrong secrets. A token without a
    /// separator is `InvalidTokenFormat`; an unknown prefix is `NotFound`.
    pub async fn validate(&self, token: &str) -> Result<bool, DomainError> {
        if let Some(override_key) = &self.override_key {
            if override_key.matches(token) {
                debug!("API key validated via static override");
                return Ok(true);
            }
        }

        let parsed = BearerToken::parse(token)?;

        let api_key = self.get_by_prefix(parsed.prefix()).await?;

        if api_key.is_expired() {
            debug!(id = %api_key.id(), prefix = %api_key.prefix(), "API key is expired");
            return Ok(false);
        }

        let valid = self
            .verify_secret(parsed.secret().to_string(), api_key.hash().to_string())
            .await?;

        if !valid {
            debug!(id = %api_key.id(), prefix = %api_key.prefix(), "API key secret mismatch");
        }

        Ok(valid)
    }

    async fn hash_secret(&self, secret: String) -> Result<String, DomainError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| DomainError::generation(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_secret(&self, secret: String, hash: String) -> Result<bool, DomainError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.verify(&secret, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Verification task failed: {}", e)))?
    }
}
