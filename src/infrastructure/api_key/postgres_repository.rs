//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, NewApiKey};
use crate::domain::DomainError;

/// PostgreSQL implementation of ApiKeyRepository
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `api_keys` table if it does not exist
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id BIGSERIAL PRIMARY KEY,
                prefix VARCHAR(16) NOT NULL UNIQUE,
                hash TEXT NOT NULL,
                expiration TIMESTAMPTZ NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create api_keys table: {}", e)))?;

        info!("api_keys table ready");

        Ok(())
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO api_keys (prefix, hash, expiration)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(&new_key.prefix)
        .bind(&new_key.hash)
        .bind(new_key.expiration)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "API key with prefix '{}' already exists",
                    new_key.prefix
                ))
            } else {
                DomainError::storage(format!("Failed to create API key: {}", e))
            }
        })?;

        let id = id_from_db(row.get("id"))?;
        let created_at: DateTime<Utc> = row.get("created_at");

        Ok(new_key.into_api_key(id, created_at))
    }

    async fn get(&self, id: ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, prefix, hash, expiration, created_at
            FROM api_keys
            WHERE id = $1
            "#,
        )
        .bind(id_to_db(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, prefix, hash, expiration, created_at
            FROM api_keys
            WHERE prefix = $1
            "#,
        )
        .bind(prefix)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API key by prefix: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn list(&self) -> Result<Vec<ApiKey>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, prefix, hash, expiration, created_at
            FROM api_keys
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter().map(row_to_api_key).collect()
    }

    async fn set_expiration(
        &self,
        id: ApiKeyId,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE api_keys
            SET expiration = $2
            WHERE id = $1
            RETURNING id, prefix, hash, expiration, created_at
            "#,
        )
        .bind(id_to_db(id)?)
        .bind(expiration)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update API key expiration: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn delete(&self, id: ApiKeyId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id_to_db(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete API key: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Health check failed: {}", e)))?;

        let _: i32 = row.get(0);
        Ok(true)
    }
}

fn row_to_api_key(row: &PgRow) -> Result<ApiKey, DomainError> {
    let id = id_from_db(row.get("id"))?;
    let prefix: String = row.get("prefix");
    let hash: String = row.get("hash");
    let expiration: Option<DateTime<Utc>> = row.get("expiration");
    let created_at: DateTime<Utc> = row.get("created_at");

    Ok(ApiKey::new(id, prefix, hash, expiration, created_at))
}

// BIGSERIAL is signed; IDs beyond i64::MAX cannot exist in the table.
fn id_to_db(id: ApiKeyId) -> Result<i64, DomainError> {
    i64::try_from(id.value())
        .map_err(|_| DomainError::validation(format!("API key ID {} is out of range", id)))
}

fn id_from_db(id: i64) -> Result<ApiKeyId, DomainError> {
    u64::try_from(id)
        .map(ApiKeyId::new)
        .map_err(|_| DomainError::storage(format!("Stored API key ID {} is negative", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_conversion() {
        assert_eq!(id_to_db(ApiKeyId::new(42)).unwrap(), 42);
        assert_eq!(id_from_db(42).unwrap(), ApiKeyId::new(42));
    }

    #[test]
    fn test_id_out_of_range() {
        assert!(matches!(
            id_to_db(ApiKeyId::new(u64::MAX)),
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(id_from_db(-1), Err(DomainError::Storage { .. })));
    }

    async fn connect() -> PostgresApiKeyRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .unwrap();

        let repo = PostgresApiKeyRepository::new(pool);
        repo.ensure_table().await.unwrap();
        repo
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_postgres_round_trip_and_duplicate_prefix() {
        let repo = connect().await;
        let prefix = crate::infrastructure::api_key::random_url_safe_string(7).unwrap();
        let expiration = Utc::now() + chrono::Duration::hours(1);

        let created = repo
            .create(NewApiKey::new(&prefix, "hash-value", Some(expiration)))
            .await
            .unwrap();
        assert_eq!(created.prefix(), prefix);

        let fetched = repo.get_by_prefix(&prefix).await.unwrap().unwrap();
        assert_eq!(fetched.id(), created.id());
        assert_eq!(fetched.hash(), "hash-value");
        assert_eq!(
            fetched.expiration().map(|dt| dt.timestamp_micros()),
            Some(expiration.timestamp_micros())
        );

        let duplicate = repo
            .create(NewApiKey::new(&prefix, "other-hash", None))
            .await;
        assert!(matches!(duplicate, Err(DomainError::Conflict { .. })));

        let expired = repo
            .set_expiration(created.id(), Some(Utc::now()))
            .await
            .unwrap()
            .unwrap();
        assert!(expired.is_expired());

        assert!(repo.health_check().await.unwrap());
        assert!(repo.delete(created.id()).await.unwrap());
        assert!(!repo.delete(created.id()).await.unwrap());
        assert!(repo.get(created.id()).await.unwrap().is_none());
    }
}
