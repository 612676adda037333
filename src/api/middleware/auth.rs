//! API key authentication middleware

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::{debug, error};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::DomainError;

const INVALID_API_KEY: &str = "Invalid API key";

/// Extractor that requires a valid API key
///
/// Extracts the API key from either:
/// - Authorization header: `Bearer <api_key>`
/// - X-API-Key header: `<api_key>`
///
/// Malformed, unknown, expired and mismatched keys as well as validation
/// failures are all rejected with the same 401 response. Only the log line
/// tells them apart.
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key_value = extract_api_key_from_headers(&parts.headers)?;

        match state.api_key_service.validate(&api_key_value).await {
            Ok(true) => Ok(RequireApiKey),
            Ok(false) => {
                debug!("Rejected API key: expired or secret mismatch");
                Err(ApiError::unauthorized(INVALID_API_KEY))
            }
            Err(DomainError::InvalidTokenFormat) => {
                debug!("Rejected API key: malformed token");
                Err(ApiError::unauthorized(INVALID_API_KEY))
            }
            Err(DomainError::NotFound { .. }) => {
                debug!("Rejected API key: unknown prefix");
                Err(ApiError::unauthorized(INVALID_API_KEY))
            }
            Err(e) => {
                error!(error = %e, "API key validation failed");
                Err(ApiError::unauthorized(INVALID_API_KEY))
            }
        }
    }
}

fn extract_api_key_from_headers(
    headers: &axum::http::HeaderMap,
) -> Result<String, ApiError> {
    let mut undecodable = false;

    // Try Authorization header first (Bearer token)
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        match auth_header.to_str() {
            Ok(auth_str) => {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    return Ok(token.trim().to_string());
                }
            }
            Err(_) => {
                debug!("Ignoring non-UTF-8 Authorization header");
                undecodable = true;
            }
        }
    }

    if let Some(api_key_header) = headers.get("x-api-key") {
        let key = api_key_header.to_str().map_err(|_| {
            debug!("Rejected API key: non-UTF-8 X-API-Key header");
            ApiError::unauthorized(INVALID_API_KEY)
        })?;

        return Ok(key.trim().to_string());
    }

    if undecodable {
        debug!("Rejected API key: non-UTF-8 Authorization header");
        return Err(ApiError::unauthorized(INVALID_API_KEY));
    }

    Err(ApiError::unauthorized(
        "API key required. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header",
    ))
}
