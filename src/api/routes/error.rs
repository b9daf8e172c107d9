//! API error handling utilities.

use crate::services::AuthError;
use crate::storage::StorageError;
use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Adds `WWW-Authenticate: Bearer` to the response
    pub bearer_challenge: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            bearer_challenge: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            bearer_challenge: true,
            ..Self::new(StatusCode::UNAUTHORIZED, message)
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound {
                entity_type,
                entity_id,
            } if entity_type == "note" => {
                ApiError::not_found(format!("No data found for ID: {}", entity_id))
            }
            StorageError::NotFound {
                entity_type,
                entity_id,
            } => ApiError::not_found(format!("No {} found for ID: {}", entity_type, entity_id)),
            StorageError::Conflict { entity_type, .. } if entity_type == "user" => {
                ApiError::new(StatusCode::CONFLICT, "Username already registered")
            }
            StorageError::Conflict { entity_type, key } => ApiError::new(
                StatusCode::CONFLICT,
                format!("{} already exists: {}", entity_type, key),
            ),
            other => {
                tracing::error!("Storage failure: {}", other);
                ApiError::internal()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired | AuthError::InvalidToken(_) => {
                tracing::warn!("Rejected token: {}", err);
                ApiError::unauthorized("Invalid or expired token")
            }
            other => {
                tracing::error!("Authentication failure: {}", other);
                ApiError::internal()
            }
        }
    }
}

/// Extractor rejections keep axum's status and message but use the JSON body.
macro_rules! impl_from_rejection {
    ($($rejection:ty),* $(,)?) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    tracing::debug!("Rejected request: {}", rejection.body_text());
                    ApiError::new(rejection.status(), rejection.body_text())
                }
            }
        )*
    };
}

impl_from_rejection!(JsonRejection, PathRejection, QueryRejection, FormRejection);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.message,
        };
        let mut response = (self.status, axum::Json(body)).into_response();
        if self.bearer_challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
