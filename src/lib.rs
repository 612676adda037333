//! keygate
//!
//! API key issuance, storage and verification for a control-plane service:
//! - Opaque bearer tokens of the form `<prefix>.<secret>`
//! - Argon2id hashes of the secret half, never the secret itself
//! - Expiration, hard deletion and an optional static override credential
//! - In-memory and PostgreSQL storage backends

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use api::state::{ApiKeyServiceTrait, AppState};
use crate::config::StorageBackend;
use domain::DomainError;
use infrastructure::api_key::{
    ApiKeyService, InMemoryApiKeyRepository, PostgresApiKeyRepository,
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let override_key = config.auth.override_key.as_deref();

    if override_key.is_some_and(|key| !key.is_empty()) {
        warn!("Static override API key is configured; it authenticates without a store lookup");
    }

    info!("Storage backend: {:?}", config.storage.backend);

    let api_key_service: Arc<dyn ApiKeyServiceTrait> = match config.storage.backend {
        StorageBackend::Memory => {
            let repository = Arc::new(InMemoryApiKeyRepository::new());
            Arc::new(ApiKeyService::new(repository).with_override_key(override_key))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .storage
                .database_url
                .clone()
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .ok_or_else(|| {
                    DomainError::configuration(
                        "storage.database_url or DATABASE_URL is required for the postgres backend",
                    )
                })?;

            info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(config.storage.max_connections)
                .connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            let repository = PostgresApiKeyRepository::new(pool);
            repository.ensure_table().await?;

            Arc::new(ApiKeyService::new(Arc::new(repository)).with_override_key(override_key))
        }
    };

    Ok(AppState::new(api_key_service))
}
