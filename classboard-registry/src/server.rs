//! Axum router setup.

use crate::auth::admin_middleware;
use crate::config::RegistryConfig;
use crate::handlers::{devices, registry};
use crate::storage::RegistryStorage;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub storage: RegistryStorage,
    pub admin_token: Option<Arc<str>>,
    pub max_device_id_len: usize,
}

pub fn build_router(storage: RegistryStorage, config: &RegistryConfig) -> Router {
    let state = AppState {
        storage,
        admin_token: config.admin_token.as_deref().map(Arc::from),
        max_device_id_len: config.max_device_id_len,
    };

    // Admin routes
    let admin = Router::new()
        .route("/api/devices", get(devices::list_devices))
        .route(
            "/api/devices/{id}",
            put(devices::activate_device).delete(devices::delete_device),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ));

    // Tablet routes
    let public = Router::new()
        .route("/api/registry/handshake", post(registry::handshake))
        .route("/api/registry/status/{device_id}", get(registry::status))
        .route("/api/devices/validate", get(devices::validate_route))
        .route("/health", get(health));

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.max_payload_size))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
