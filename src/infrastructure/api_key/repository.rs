//! In-memory API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, NewApiKey};
use crate::domain::DomainError;

#[derive(Debug)]
struct State {
    keys: BTreeMap<ApiKeyId, ApiKey>,
    prefix_index: HashMap<String, ApiKeyId>,
    next_id: u64,
}

/// In-memory implementation of ApiKeyRepository
///
/// Records, prefix index and ID counter share one lock, so inserts and
/// deletes are atomic with respect to readers.
#[derive(Debug)]
pub struct InMemoryApiKeyRepository {
    state: RwLock<State>,
}

impl InMemoryApiKeyRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                keys: BTreeMap::new(),
                prefix_index: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryApiKeyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, DomainError> {
        let mut state = self.state.write().await;

        if state.prefix_index.contains_key(&new_key.prefix) {
            return Err(DomainError::conflict(format!(
                "API key with prefix '{}' already exists",
                new_key.prefix
            )));
        }

        let id = ApiKeyId::new(state.next_id);
        state.next_id += 1;

        let api_key = new_key.into_api_key(id, Utc::now());

        state.prefix_index.insert(api_key.prefix().to_string(), id);
        state.keys.insert(id, api_key.clone());

        Ok(api_key)
    }

    async fn get(&self, id: ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let state = self.state.read().await;
        Ok(state.keys.get(&id).cloned())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Option<ApiKey>, DomainError> {
        let state = self.state.read().await;

        Ok(state
            .prefix_index
            .get(prefix)
            .and_then(|id| state.keys.get(id))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        let state = self.state.read().await;
        Ok(state.keys.values().cloned().collect())
    }

    async fn set_expiration(
        &self,
        id: ApiKeyId,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<Option<ApiKey>, DomainError> {
        let mut state = self.state.write().await;

        Ok(state.keys.get_mut(&id).map(|key| {
            key.set_expiration(expiration);
            key.clone()
        }))
    }

    async fn delete(&self, id: ApiKeyId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;

        if let Some(key) = state.keys.remove(&id) {
            state.prefix_index.remove(key.prefix());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_key(prefix: &str) -> NewApiKey {
        NewApiKey::new(prefix, format!("hash-of-{}", prefix), None)
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryApiKeyRepository::new();

        let first = repo.create(new_key("aaaaaaa")).await.unwrap();
        let second = repo.create(new_key("bbbbbbb")).await.unwrap();

        assert_eq!(first.id(), ApiKeyId::new(1));
        assert_eq!(second.id(), ApiKeyId::new(2));
        assert_eq!(first.prefix(), "aaaaaaa");
        assert_eq!(first.hash(), "hash-of-aaaaaaa");
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = InMemoryApiKeyRepository::new();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_prefix() {
        let repo = InMemoryApiKeyRepository::new();

        repo.create(new_key("aaaaaaa")).await.unwrap();
        let result = repo.create(new_key("aaaaaaa")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_and_get_by_prefix() {
        let repo = InMemoryApiKeyRepository::new();
        let created = repo.create(new_key("aaaaaaa")).await.unwrap();

        let by_id = repo.get(created.id()).await.unwrap();
        let by_prefix = repo.get_by_prefix("aaaaaaa").await.unwrap();

        assert_eq!(by_id, Some(created.clone()));
        assert_eq!(by_prefix, Some(created));
        assert!(repo.get(ApiKeyId::new(99)).await.unwrap().is_none());
        assert!(repo.get_by_prefix("zzzzzzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_by_id() {
        let repo = InMemoryApiKeyRepository::new();

        for prefix in ["ccccccc", "aaaaaaa", "bbbbbbb"] {
            repo.create(new_key(prefix)).await.unwrap();
        }

        let keys = repo.list().await.unwrap();
        let ids: Vec<u64> = keys.iter().map(|k| k.id().value()).collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_set_expiration() {
        let repo = InMemoryApiKeyRepository::new();
        let created = repo.create(new_key("aaaaaaa")).await.unwrap();
        let now = Utc::now();

        let updated = repo
            .set_expiration(created.id(), Some(now))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.expiration(), Some(now));
        assert_eq!(updated.hash(), created.hash());

        let stored = repo.get(created.id()).await.unwrap().unwrap();
        assert_eq!(stored.expiration(), Some(now));
    }

    #[tokio::test]
    async fn test_set_expiration_missing() {
        let repo = InMemoryApiKeyRepository::new();

        let result = repo
            .set_expiration(ApiKeyId::new(1), Some(Utc::now()))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_frees_prefix() {
        let repo = InMemoryApiKeyRepository::new();
        let created = repo.create(new_key("aaaaaaa")).await.unwrap();

        assert!(repo.delete(created.id()).await.unwrap());
        assert!(!repo.delete(created.id()).await.unwrap());
        assert!(repo.get_by_prefix("aaaaaaa").await.unwrap().is_none());

        let recreated = repo.create(new_key("aaaaaaa")).await.unwrap();
        assert_ne!(recreated.id(), created.id());
    }

    #[tokio::test]
    async fn test_concurrent_creates() {
        let repo = Arc::new(InMemoryApiKeyRepository::new());
        let mut handles = Vec::new();

        for i in 0..50 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(new_key(&format!("key{:04}", i))).await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let keys = repo.list().await.unwrap();
        assert_eq!(keys.len(), 50);
        assert_eq!(keys.last().unwrap().id(), ApiKeyId::new(50));
    }
}
