//! Domain layer - core types, repository traits and errors

pub mod api_key;
pub mod error;

pub use api_key::{ApiKey, ApiKeyId, ApiKeyRepository, BearerToken, NewApiKey};
pub use error::DomainError;
