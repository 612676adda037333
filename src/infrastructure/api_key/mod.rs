//! API Key infrastructure implementations
//!
//! Key generation, secret hashing, the static override credential, storage
//! backends and the service tying them together.

mod generator;
mod hasher;
mod override_key;
mod postgres_repository;
mod repository;
mod service;

pub use generator::{random_url_safe_string, ApiKeyGenerator, GeneratedApiKey};
pub use hasher::{Argon2Hasher, SecretHasher};
pub use override_key::OverrideKey;
pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, CreateApiKeyResult};
