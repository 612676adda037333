//! API Key entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// API Key identifier, assigned by the store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(u64);

impl ApiKeyId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ApiKeyId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for ApiKeyId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| DomainError::validation(format!("Invalid API key ID: '{}'", s)))
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored API key record
///
/// Holds the public prefix and the hash of the secret half. The secret itself
/// is never part of the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    id: ApiKeyId,
    /// Public lookup key, unique across live records
    prefix: String,
    /// PHC-formatted hash of the secret half
    hash: String,
    /// `None` = never expires
    expiration: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Rebuild a record as it was persisted
    pub fn new(
        id: ApiKeyId,
        prefix: impl Into<String>,
        hash: impl Into<String>,
        expiration: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            prefix: prefix.into(),
            hash: hash.into(),
            expiration,
            created_at,
        }
    }

    // Getters

    pub fn id(&self) -> ApiKeyId {
        self.id
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // Status checks

    /// Check if the key has expired at the given instant
    ///
    /// A key whose expiration equals `now` counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|expiration| expiration <= now)
    }

    /// Check if the key has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Set expiration; only the store calls this when persisting an expire
    pub(crate) fn set_expiration(&mut self, expiration: Option<DateTime<Utc>>) {
        self.expiration = expiration;
    }
}

/// Payload for inserting a new key; the store assigns id and creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiKey {
    pub prefix: String,
    pub hash: String,
    pub expiration: Option<DateTime<Utc>>,
}

impl NewApiKey {
    pub fn new(
        prefix: impl Into<String>,
        hash: impl Into<String>,
        expiration: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            hash: hash.into(),
            expiration,
        }
    }

    /// Materialize the record once the store has assigned its identity
    pub fn into_api_key(self, id: ApiKeyId, created_at: DateTime<Utc>) -> ApiKey {
        ApiKey::new(id, self.prefix, self.hash, self.expiration, created_at)
    }
}
