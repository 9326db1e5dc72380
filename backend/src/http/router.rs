//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; there is no authentication to protect.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/reservations",
            get(handlers::list_reservations).post(handlers::create_reservation),
        )
        .route(
            "/reservations/{id}",
            get(handlers::get_reservation).delete(handlers::cancel_reservation),
        )
        .route(
            "/times",
            get(handlers::list_time_slots).post(handlers::create_time_slot),
        )
        .route(
            "/themes",
            get(handlers::list_themes).post(handlers::create_theme),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
