//! Authentication routes: registration, password login and the current user.
//!
//! Login follows the OAuth2 password flow: a form-encoded `username` and
//! `password` are exchanged for a bearer token.

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::app_state::AppState;
use super::auth_context::AuthUser;
use super::error::{ApiError, ErrorBody};
use crate::models::{Token, UserIn, UserOut};

/// Form body for POST /login
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Create the auth router. Paths are absolute so it can be merged at the root.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/users/me/", get(read_current_user))
        .route("/users/me", get(read_current_user))
}

/// Usernames are stored and looked up without surrounding whitespace.
fn normalize_username(raw: &str) -> &str {
    raw.trim()
}

/// Run bcrypt off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!("Blocking task failed: {}", e);
        ApiError::internal()
    })
}

/// POST /register/ - Create a user
#[utoipa::path(
    post,
    path = "/register/",
    tag = "Authentication",
    request_body = UserIn,
    responses(
        (status = 201, description = "User created", body = UserOut),
        (status = 409, description = "Username already registered", body = ErrorBody),
        (status = 422, description = "Empty username or password", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UserIn>, ApiError>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let username = normalize_username(&payload.username);
    if username.is_empty() {
        return Err(ApiError::unprocessable("username must not be empty"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::unprocessable("password must not be empty"));
    }

    let passwords = state.passwords;
    let password = payload.password;
    let hashed = blocking(move || passwords.hash(&password)).await??;

    let user = state.storage.create_user(username, &hashed).await?;
    info!("Registered user {} (id {})", user.username, user.id);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /login - Exchange username and password for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token", body = Token),
        (status = 401, description = "Incorrect username or password", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Form(form), _): WithRejection<Form<LoginForm>, ApiError>,
) -> Result<Json<Token>, ApiError> {
    let username = normalize_username(&form.username);
    let user = state.storage.get_user_by_username(username).await?;

    let passwords = state.passwords;
    let password = form.password;
    let hashed = user.as_ref().map(|record| record.hashed_password.clone());
    let verified = blocking(move || match hashed {
        Some(hashed) => passwords.verify(&password, &hashed),
        None => passwords.verify_missing_user(&password),
    })
    .await?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            warn!("Failed login attempt for {}", username);
            return Err(ApiError::unauthorized("Incorrect username or password"));
        }
    };

    let access_token = state.jwt_service.issue_access_token(&user.username)?;
    info!("User {} logged in", user.username);
    Ok(Json(Token::bearer(access_token)))
}

/// GET /users/me/ - The user owning the bearer token
#[utoipa::path(
    get,
    path = "/users/me/",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = UserOut),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn read_current_user(auth: AuthUser) -> Json<UserOut> {
    Json(auth.user)
}
