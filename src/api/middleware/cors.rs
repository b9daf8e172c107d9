//! CORS middleware configuration.

use tower_http::cors::CorsLayer;

/// Create a CORS layer that accepts any origin, method and header, and allows
/// credentials.
///
/// The request origin is mirrored back instead of answering `*`, since
/// browsers refuse a wildcard origin on credentialed requests.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::very_permissive()
}
