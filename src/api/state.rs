//! Application state for shared services

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::DomainError;
use crate::infrastructure::api_key::{ApiKeyService, CreateApiKeyResult};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub api_key_service: Arc<dyn ApiKeyServiceTrait>,
}

impl AppState {
    pub fn new(api_key_service: Arc<dyn ApiKeyServiceTrait>) -> Self {
        Self { api_key_service }
    }
}

/// Trait for API key service operations
#[async_trait::async_trait]
pub trait ApiKeyServiceTrait: Send + Sync {
    async fn create(
        &self,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<CreateApiKeyResult, DomainError>;
    async fn list(&self) -> Result<Vec<ApiKey>, DomainError>;
    async fn get(&self, id: ApiKeyId) -> Result<ApiKey, DomainError>;
    async fn get_by_prefix(&self, prefix: &str) -> Result<ApiKey, DomainError>;
    async fn expire(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError>;
    async fn destroy(&self, api_key: &ApiKey) -> Result<(), DomainError>;
    async fn validate(&self, token: &str) -> Result<bool, DomainError>;
    async fn health_check(&self) -> Result<bool, DomainError>;
}

#[async_trait::async_trait]
impl<R: ApiKeyRepository + 'static> ApiKeyServiceTrait for ApiKeyService<R> {
    async fn create(
        &self,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<CreateApiKeyResult, DomainError> {
        ApiKeyService::create(self, expiration).await
    }

    async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        ApiKeyService::list(self).await
    }

    async fn get(&self, id: ApiKeyId) -> Result<ApiKey, DomainError> {
        ApiKeyService::get(self, id).await
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<ApiKey, DomainError> {
        ApiKeyService::get_by_prefix(self, prefix).await
    }

    async fn expire(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        ApiKeyService::expire(self, api_key).await
    }

    async fn destroy(&self, api_key: &ApiKey) -> Result<(), DomainError> {
        ApiKeyService::destroy(self, api_key).await
    }

    async fn validate(&self, token: &str) -> Result<bool, DomainError> {
        ApiKeyService::validate(self, token).await
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        ApiKeyService::health_check(self).await
    }
}
