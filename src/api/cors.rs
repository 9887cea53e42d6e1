//! CORS configuration using tower-http.

use axum::http::{header, Method};
use tower_http::cors::CorsLayer;

/// CORS configuration for a browser front end on a known origin.
///
/// Allows the given origin with credentials (the session cookie must ride
/// along), the methods the book routes use, and JSON request bodies.
pub fn for_origin(origin: &str) -> CorsLayer {
    let origins: Vec<_> = origin
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
