//! API routes module - organizes all route handlers.
//!
//! Notes live under /notes/, user authentication under /register/, /login and
//! /users/me/. Health and OpenAPI endpoints sit at the root.

pub mod app_state;
pub mod auth;
pub mod auth_context;
pub mod error;
pub mod health;
pub mod notes;
pub mod openapi;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub use app_state::AppState;
pub use error::ApiError;

use crate::middleware::{cors::create_cors_layer, rate_limit};
use crate::services::{JwtService, PasswordService};

/// Secret used by [`create_app_state`]. Not for deployed instances.
pub const LOCAL_JWT_SECRET: &str = "local-notes-api-secret-for-tests-only";

/// Create the main API router combining all route modules
///
/// State is applied by callers (see [`build_app`]).
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(health::health_router())
        .merge(notes::notes_router())
        .merge(auth::auth_router())
        // OpenAPI documentation endpoints
        .merge(openapi::openapi_router())
}

/// Apply state and the middleware stack: request tracing, CORS, gzip and,
/// when `rate_limit_per_minute` is set, a global rate limit.
pub fn build_app(app_state: AppState, rate_limit_per_minute: Option<u32>) -> Router {
    let mut app = create_api_router().with_state(app_state);

    if let Some(per_minute) = rate_limit_per_minute {
        tracing::info!("Rate limiting enabled: {} requests/minute", per_minute);
        let limiter = rate_limit::create_rate_limiter_with_quota(per_minute);
        app = app.layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit_middleware,
        ));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer())
            .layer(CompressionLayer::new()),
    )
}

/// bcrypt work factor for [`create_app_state`]; the minimum bcrypt accepts.
const LOCAL_BCRYPT_COST: u32 = 4;

/// Create an in-memory application state, for tests and local experiments.
pub fn create_app_state() -> AppState {
    AppState::in_memory(
        JwtService::new(LOCAL_JWT_SECRET, 30),
        PasswordService::with_cost(LOCAL_BCRYPT_COST),
    )
}
