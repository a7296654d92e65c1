/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Service routes (`/health`, `/ws`)
 * 2. API routes (public auth endpoints, then the protected group)
 * 3. Fallback handler (JSON 404)
 *
 * # Layers
 *
 * CORS admits the configured frontend origin with credentials. Every
 * request is traced through `tower_http::trace::TraceLayer`.
 */

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::realtime::handle_socket_upgrade;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// 404 for anything no route matched
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not Found" })),
    )
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!("Invalid FRONTEND_URL {:?}; cross-origin requests will be refused", frontend_url);
            layer
        }
    }
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state shared by every handler
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Route Details
///
/// ## Service Routes
///
/// - `GET /health` - Liveness check
/// - `GET /ws` - WebSocket upgrade (token in `?token=` or bearer header)
///
/// ## API Routes
///
/// See [`crate::backend::routes::api_routes`].
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/ws", get(handle_socket_upgrade));

    let router = configure_api_routes(router, app_state.clone());

    router
        .fallback(not_found)
        .layer(cors_layer(&app_state.config.frontend_url))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
