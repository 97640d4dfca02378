//! HTTP surface: content generation and deck download.

pub mod handlers;
pub mod state;

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use log::warn;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
pub use state::AppState;

/// Deck response headers, exposed to browser clients.
pub const SLIDES_RENDERED: &str = "x-slides-rendered";
pub const SLIDES_SKIPPED: &str = "x-slides-skipped";

/// Build the application router with its CORS layer.
pub fn router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/content_generation_api", post(handlers::content_generation))
        .route("/content_generation_stream", post(handlers::content_generation_stream))
        .route("/generate_ppt", post(handlers::generate_ppt))
        .layer(cors)
        .with_state(state)
}

/// Any origin when none are configured; otherwise only the listed ones.
/// Unparseable origins are logged and dropped.
pub fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([
            HeaderName::from_static(SLIDES_RENDERED),
            HeaderName::from_static(SLIDES_SKIPPED),
        ])
        .max_age(Duration::from_secs(3600));

    if config.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
