use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        // Admin API, every route requires a valid API key
        .nest("/admin", admin::create_admin_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
