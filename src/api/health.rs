//! Health check endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;

/// Health response with optional component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Health check status
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Liveness - returns 200 if the process is serving requests
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness - verifies the key store answers queries
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();

    let key_store_check = check_key_store(&state).await;
    let overall_status = key_store_check.status;

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(vec![key_store_check]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

async fn check_key_store(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    match state.api_key_service.health_check().await {
        Ok(true) => HealthCheck {
            name: "key_store".to_string(),
            status: HealthStatus::Healthy,
            message: None,
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Ok(false) => HealthCheck {
            name: "key_store".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some("Key store reported unhealthy".to_string()),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(e) => HealthCheck {
            name: "key_store".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(e.to_string()),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::api_key::MockApiKeyRepository;
    use crate::domain::DomainError;
    use crate::infrastructure::api_key::{ApiKeyService, InMemoryApiKeyRepository};

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "1.0.0".to_string(),
            checks: None,
            latency_ms: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(!json.contains("checks"));
    }

    #[tokio::test]
    async fn test_key_store_check_healthy() {
        let service = ApiKeyService::new(Arc::new(InMemoryApiKeyRepository::new()));
        let state = AppState::new(Arc::new(service));

        let check = check_key_store(&state).await;

        assert_eq!(check.status, HealthStatus::Healthy);
        assert!(check.message.is_none());
    }

    #[tokio::test]
    async fn test_key_store_check_unhealthy() {
        let mut repo = MockApiKeyRepository::new();
        repo.expect_health_check()
            .returning(|| Err(DomainError::storage("connection refused")));
        let state = AppState::new(Arc::new(ApiKeyService::new(Arc::new(repo))));

        let check = check_key_store(&state).await;

        assert_eq!(check.status, HealthStatus::Unhealthy);
        assert!(check.message.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_key_store_check_does_not_load_keys() {
        let mut repo = MockApiKeyRepository::new();
        repo.expect_list().never();
        repo.expect_health_check().times(1).returning(|| Ok(true));
        let state = AppState::new(Arc::new(ApiKeyService::new(Arc::new(repo))));

        let check = check_key_store(&state).await;

        assert_eq!(check.status, HealthStatus::Healthy);
    }
}
