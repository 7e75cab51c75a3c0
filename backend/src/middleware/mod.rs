//! General-purpose middleware for the API.
//!
//! Currently just the CORS layer. Without `ALLOWED_ORIGIN` the API stays
//! same-origin; with it, the configured admin frontend may send credentialed
//! requests.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::config::Config;

pub fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    match config.allowed_origin.as_deref() {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value).allow_credentials(true),
            Err(_) => {
                warn!(origin, "ALLOWED_ORIGIN is not a valid header value; CORS disabled");
                layer
            }
        },
        None => layer,
    }
}
