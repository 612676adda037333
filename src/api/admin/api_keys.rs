//! API key management admin endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireApiKey;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::api_key::{ApiKey, ApiKeyId};

/// Request to create a new API key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateApiKeyRequest {
    /// RFC 3339 timestamp; omitted = never expires
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

/// API key response for admin API
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub id: u64,
    pub prefix: String,
    pub expiration: Option<String>,
    pub expired: bool,
    pub created_at: String,
}

/// API key response with the bearer token (only on creation)
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyWithTokenResponse {
    #[serde(flatten)]
    pub api_key: ApiKeyResponse,
    pub token: String,
}

impl From<&ApiKey> for ApiKeyResponse {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id().value(),
            prefix: key.prefix().to_string(),
            expiration: key.expiration().map(|dt| dt.to_rfc3339()),
            expired: key.is_expired(),
            created_at: key.created_at().to_rfc3339(),
        }
    }
}

/// List API keys response
#[derive(Debug, Clone, Serialize)]
pub struct ListApiKeysResponse {
    pub api_keys: Vec<ApiKeyResponse>,
    pub total: usize,
}

/// GET /admin/api-keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    _: RequireApiKey,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    debug!("Admin listing all API keys");

    let keys = state.api_key_service.list().await?;

    let key_responses: Vec<ApiKeyResponse> = keys.iter().map(ApiKeyResponse::from).collect();
    let total = key_responses.len();

    Ok(Json(ListApiKeysResponse {
        api_keys: key_responses,
        total,
    }))
}

/// POST /admin/api-keys
pub async fn create_api_key(
    State(state): State<AppState>,
    _: RequireApiKey,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ApiKeyWithTokenResponse>), ApiError> {
    debug!(expiration = ?request.expiration, "Admin creating API key");

    let created = state.api_key_service.create(request.expiration).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiKeyWithTokenResponse {
            api_key: ApiKeyResponse::from(&created.api_key),
            token: created.token,
        }),
    ))
}

/// GET /admin/api-keys/{key_id}
pub async fn get_api_key(
    State(state): State<AppState>,
    _: RequireApiKey,
    Path(key_id): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    debug!(key_id = %key_id, "Admin getting API key");

    let key = state.api_key_service.get(key_id.parse::<ApiKeyId>()?).await?;

    Ok(Json(ApiKeyResponse::from(&key)))
}

/// GET /admin/api-keys/prefix/{prefix}
pub async fn get_api_key_by_prefix(
    State(state): State<AppState>,
    _: RequireApiKey,
    Path(prefix): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    debug!(prefix = %prefix, "Admin getting API key by prefix");

    let key = state.api_key_service.get_by_prefix(&prefix).await?;

    Ok(Json(ApiKeyResponse::from(&key)))
}

/// POST /admin/api-keys/{key_id}/expire
pub async fn expire_api_key(
    State(state): State<AppState>,
    _: RequireApiKey,
    Path(key_id): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    debug!(key_id = %key_id, "Admin expiring API key");

    let key = state.api_key_service.get(key_id.parse::<ApiKeyId>()?).await?;
    let expired = state.api_key_service.expire(&key).await?;

    Ok(Json(ApiKeyResponse::from(&expired)))
}

/// DELETE /admin/api-keys/{key_id}
pub async fn delete_api_key(
    State(state): State<AppState>,
    _: RequireApiKey,
    Path(key_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(key_id = %key_id, "Admin destroying API key");

    let key = state.api_key_service.get(key_id.parse::<ApiKeyId>()?).await?;
    state.api_key_service.destroy(&key).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_api_key_request_minimal() {
        let request: CreateApiKeyRequest = serde_json::from_str("{}").unwrap();
        assert!(request.expiration.is_none());
    }

    #[test]
    fn test_create_api_key_request_with_expiration() {
        let json = r#"{ "expiration": "2030-01-01T00:00:00Z" }"#;

        let request: CreateApiKeyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.expiration.unwrap().to_rfc3339(),
            "2030-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_create_api_key_request_invalid_expiration() {
        let json = r#"{ "expiration": "next tuesday" }"#;

        assert!(serde_json::from_str::<CreateApiKeyRequest>(json).is_err());
    }

    #[test]
    fn test_api_key_response_omits_hash() {
        let key = ApiKey::new(
            ApiKeyId::new(3),
            "abcdefg",
            "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
            None,
            Utc::now(),
        );

        let json = serde_json::to_string(&ApiKeyResponse::from(&key)).unwrap();

        assert!(json.contains("\"id\":3"));
        assert!(json.contains("\"prefix\":\"abcdefg\""));
        assert!(json.contains("\"expired\":false"));
        assert!(!json.contains("argon2"));
    }
}
