//! API Key repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

use super::entity::{ApiKey, ApiKeyId, NewApiKey};
use crate::domain::DomainError;

/// Repository trait for API key storage
///
/// Implementations enforce prefix uniqueness and must make an insert visible
/// atomically: a concurrent `list` or `get` sees the whole record or nothing.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Insert a new key, assigning its ID and creation time.
    /// A prefix already in use yields `DomainError::Conflict`.
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, DomainError>;

    /// Get an API key by its ID
    async fn get(&self, id: ApiKeyId) -> Result<Option<ApiKey>, DomainError>;

    /// Get an API key by its prefix (lookup during authentication)
    async fn get_by_prefix(&self, prefix: &str) -> Result<Option<ApiKey>, DomainError>;

    /// List all API keys ordered by ID
    async fn list(&self) -> Result<Vec<ApiKey>, DomainError>;

    /// Overwrite the expiration of a key, returning the updated record
    async fn set_expiration(
        &self,
        id: ApiKeyId,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<Option<ApiKey>, DomainError>;

    /// Hard delete; returns whether a record was removed
    async fn delete(&self, id: ApiKeyId) -> Result<bool, DomainError>;

    /// Check that the store answers queries without loading any records
    async fn health_check(&self) -> Result<bool, DomainError>;
}
