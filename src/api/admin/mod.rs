//! Admin API endpoints for managing API keys

pub mod api_keys;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api-keys",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route(
            "/api-keys/{key_id}",
            get(api_keys::get_api_key).delete(api_keys::delete_api_key),
        )
        .route(
            "/api-keys/prefix/{prefix}",
            get(api_keys::get_api_key_by_prefix),
        )
        .route("/api-keys/{key_id}/expire", post(api_keys::expire_api_key))
}
