//! JWT Service for token generation and validation.
//!
//! Issues HS256 access tokens whose subject is the username.
//! - Tokens created without an explicit lifetime expire after 15 minutes
//! - Login tokens use the configured `access_token_expire_minute`

use crate::config::{AppConfig, ConfigError, MAX_TOKEN_MINUTES};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_TOKEN_MINUTES: i64 = 15;

/// Authentication failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Failed to encode token: {0}")]
    Encoding(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT Service configuration
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_token_duration: Duration,
    access_token_duration: Duration,
}

impl JwtService {
    /// Create a new JWT service with the given secret and login token lifetime.
    ///
    /// A lifetime outside `1..=MAX_TOKEN_MINUTES` falls back to 15 minutes.
    pub fn new(secret: &str, access_token_minutes: i64) -> Self {
        let default_token_duration = Duration::minutes(DEFAULT_TOKEN_MINUTES);
        let access_token_duration = Some(access_token_minutes)
            .filter(|m| (1..=MAX_TOKEN_MINUTES).contains(m))
            .and_then(Duration::try_minutes)
            .unwrap_or_else(|| {
                warn!(
                    "Token lifetime of {} minutes is out of range, using {}",
                    access_token_minutes, DEFAULT_TOKEN_MINUTES
                );
                default_token_duration
            });
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            default_token_duration,
            access_token_duration,
        }
    }

    /// Build the service from configuration. See [`AppConfig::resolve_jwt_secret`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let secret = config.resolve_jwt_secret()?;
        Ok(Self::new(&secret, config.auth.access_token_expire_minutes))
    }

    /// Lifetime used for tokens issued at login.
    pub fn access_token_duration(&self) -> Duration {
        self.access_token_duration
    }

    /// Create a signed token for `subject`. Without `expires_delta` the token
    /// lives for 15 minutes.
    pub fn create_access_token(
        &self,
        subject: &str,
        expires_delta: Option<Duration>,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let expire = now
            .checked_add_signed(expires_delta.unwrap_or(self.default_token_duration))
            .ok_or_else(|| AuthError::Encoding("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expire.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))?;
        debug!("Issued access token for {} (expires {})", subject, expire);
        Ok(token)
    }

    /// Create a login token using the configured lifetime.
    pub fn issue_access_token(&self, subject: &str) -> Result<String, AuthError> {
        self.create_access_token(subject, Some(self.access_token_duration))
    }

    /// Decode and validate a token (checks signature and expiration)
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Invalid token format".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid token signature".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    /// Extract bearer token from Authorization header. The scheme is matched
    /// case-insensitively.
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        let (scheme, token) = auth_header.trim().split_once(' ')?;
        let token = token.trim();
        if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
            Some(token)
        } else {
            None
        }
    }
}

/// Shared JWT service for use across the application
pub type SharedJwtService = Arc<JwtService>;
