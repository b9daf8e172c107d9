//! Note routes: create, update, list, read and delete.
//!
//! Every path is served both with and without the trailing slash.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::app_state::AppState;
use super::error::{ApiError, ErrorBody};
use crate::models::{Note, NoteIn};
use crate::services::NoteService;

const DEFAULT_TAKE: i64 = 20;

/// Query parameters for GET /notes/
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListNotesQuery {
    /// Number of notes to skip
    #[serde(default)]
    #[param(default = 0)]
    pub skip: i64,
    /// Maximum number of notes to return
    #[serde(default = "default_take")]
    #[param(default = 20)]
    pub take: i64,
}

fn default_take() -> i64 {
    DEFAULT_TAKE
}

/// Response for DELETE /notes/{note_id}/
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Create the notes router. Paths are absolute so it can be merged at the root.
pub fn notes_router() -> Router<AppState> {
    Router::new()
        .route("/notes/", get(read_notes).post(create_note))
        .route("/notes", get(read_notes).post(create_note))
        .route(
            "/notes/{note_id}/",
            get(read_single_note).put(update_note).delete(delete_note),
        )
        .route(
            "/notes/{note_id}",
            get(read_single_note).put(update_note).delete(delete_note),
        )
}

/// POST /notes/ - Create a note
#[utoipa::path(
    post,
    path = "/notes/",
    tag = "Notes",
    request_body = NoteIn,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 422, description = "Body does not match the note schema"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_note(
    State(notes): State<NoteService>,
    WithRejection(Json(note), _): WithRejection<Json<NoteIn>, ApiError>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let created = notes.create(note).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /notes/{note_id}/ - Replace a note
#[utoipa::path(
    put,
    path = "/notes/{note_id}/",
    tag = "Notes",
    params(("note_id" = i32, Path, description = "Note identifier")),
    request_body = NoteIn,
    responses(
        (status = 200, description = "Note updated", body = Note),
        (status = 404, description = "Note not found", body = ErrorBody),
        (status = 422, description = "Body does not match the note schema")
    )
)]
pub async fn update_note(
    State(notes): State<NoteService>,
    WithRejection(Path(note_id), _): WithRejection<Path<i32>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<NoteIn>, ApiError>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(notes.update(note_id, payload).await?))
}

/// GET /notes/ - Page through notes in id order
#[utoipa::path(
    get,
    path = "/notes/",
    tag = "Notes",
    params(ListNotesQuery),
    responses(
        (status = 200, description = "Notes", body = [Note]),
        (status = 422, description = "Negative skip or take", body = ErrorBody)
    )
)]
pub async fn read_notes(
    State(notes): State<NoteService>,
    WithRejection(Query(query), _): WithRejection<Query<ListNotesQuery>, ApiError>,
) -> Result<Json<Vec<Note>>, ApiError> {
    if query.skip < 0 {
        return Err(ApiError::unprocessable("skip must be greater than or equal to 0"));
    }
    if query.take < 0 {
        return Err(ApiError::unprocessable("take must be greater than or equal to 0"));
    }
    Ok(Json(notes.list(query.skip, query.take).await?))
}

/// GET /notes/{note_id}/ - Read one note
#[utoipa::path(
    get,
    path = "/notes/{note_id}/",
    tag = "Notes",
    params(("note_id" = i32, Path, description = "Note identifier")),
    responses(
        (status = 200, description = "Note", body = Note),
        (status = 404, description = "Note not found", body = ErrorBody)
    )
)]
pub async fn read_single_note(
    State(notes): State<NoteService>,
    WithRejection(Path(note_id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<Json<Note>, ApiError> {
    tracing::debug!("Fetching note with ID: {}", note_id);
    Ok(Json(notes.get(note_id).await?))
}

/// DELETE /notes/{note_id}/ - Delete a note
#[utoipa::path(
    delete,
    path = "/notes/{note_id}/",
    tag = "Notes",
    params(("note_id" = i32, Path, description = "Note identifier")),
    responses(
        (status = 200, description = "Note deleted (or already absent)", body = MessageResponse)
    )
)]
pub async fn delete_note(
    State(notes): State<NoteService>,
    WithRejection(Path(note_id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    notes.delete(note_id).await?;
    Ok(Json(MessageResponse {
        message: format!("Note with id: {} deleted successfully!", note_id),
    }))
}
