use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserIn {
    pub username: String,
    pub password: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserOut {
    pub id: i32,
    pub username: String,
}

/// A user row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub hashed_password: String,
}

impl From<UserRecord> for UserOut {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
        }
    }
}

/// OAuth2-style bearer token response returned by `/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
