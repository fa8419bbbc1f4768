//! # Carousel Server
//!
//! HTTP server for Carousel Studio: a deck generation API backed by a
//! generative text model, a health probe, and static serving of the built
//! frontend with an SPA fallback.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod openai;
pub mod routes;
pub mod static_files;

pub use config::ServerConfig;
pub use openai::GenerateError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Resolved server configuration.
    pub config: Arc<ServerConfig>,
    /// Reused upstream HTTP client.
    pub http: reqwest::Client,
}

impl AppState {
    /// Build state from a resolved configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = config
        .cors_origin
        .as_deref()
        .and_then(|o| o.parse::<HeaderValue>().ok());
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    match origin {
        Some(origin) => layer.allow_origin(AllowOrigin::exact(origin)),
        None => layer.allow_origin(Any),
    }
}

/// Build the application router.
///
/// API responses carry `Cache-Control: no-store`; everything outside `/api`
/// falls through to the static frontend.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/generate", post(routes::generate))
        .route("/api/health", get(routes::health))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .merge(api)
        .fallback(static_files::serve_static)
        .layer(build_cors_layer(&state.config))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
