//! HTTP server for the RealWaste classifier
//!
//! Routes:
//! - `GET /health` - liveness check
//! - `POST /predict` - classify a multipart `image` upload

pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, SharedState};

/// Build the application router
pub fn router(state: SharedState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))
        // Inference
        .route("/predict", post(routes::predict::predict))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
