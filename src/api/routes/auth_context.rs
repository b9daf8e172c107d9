//! Authentication context utilities.
//!
//! Provides the extractor that turns a bearer token into the calling user.

use super::app_state::AppState;
use super::error::ApiError;
use crate::models::UserOut;
use crate::services::JwtService;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

/// Authenticated user extracted from `Authorization: Bearer <token>`
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: UserOut,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_bearer_token)
            .ok_or_else(|| {
                tracing::warn!("No authorization token provided");
                ApiError::unauthorized("Not authenticated")
            })?;

        let claims = state.jwt_service.decode_access_token(token)?;

        if claims.sub.is_empty() {
            tracing::warn!("JWT has empty subject claim");
            return Err(ApiError::unauthorized("Invalid or expired token"));
        }

        let user = state
            .storage
            .get_user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Token subject {} no longer exists", claims.sub);
                ApiError::unauthorized("Invalid or expired token")
            })?;

        Ok(AuthUser { user: user.into() })
    }
}
