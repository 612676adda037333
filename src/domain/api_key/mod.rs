//! API Key domain
//!
//! Domain types for the key lifecycle: the stored record, the insert payload,
//! the store boundary and the bearer token wire format.

mod entity;
mod repository;
mod token;

pub use entity::{ApiKey, ApiKeyId, NewApiKey};
pub use repository::ApiKeyRepository;
#[cfg(test)]
pub use repository::MockApiKeyRepository;
pub use token::{BearerToken, PREFIX_LENGTH, SECRET_LENGTH, SEPARATOR};
