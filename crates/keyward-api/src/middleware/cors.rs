//! CORS layer configuration.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use keyward_core::config::ServerConfig;

use super::auth::{RENEWED_TOKEN_EXPIRES_HEADER, RENEWED_TOKEN_HEADER};

/// Builds a CORS tower layer from configuration.
///
/// The renewal headers are exposed so browser clients can pick them up.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([RENEWED_TOKEN_HEADER, RENEWED_TOKEN_EXPIRES_HEADER]);

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    layer
}
