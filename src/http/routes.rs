use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/session/start", post(handlers::start_session))
        .route("/session/stop", post(handlers::stop_session))
        .route("/session/status", get(handlers::get_status))
        // Transcript
        .route("/session/transcript", get(handlers::get_transcript))
        .route(
            "/session/transcript/clear",
            post(handlers::clear_transcript),
        )
        .route("/session/transcript/copy", post(handlers::copy_transcript))
        // Devices
        .route("/devices", get(handlers::list_devices))
        .route("/devices/select", post(handlers::select_device))
        .route("/devices/refresh", post(handlers::refresh_devices))
        // The page consuming this API lives on another origin in development
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
