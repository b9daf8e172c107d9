use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating or replacing a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NoteIn {
    pub text: String,
    pub completed: bool,
}

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Note {
    pub id: i32,
    pub text: String,
    pub completed: bool,
}

impl Note {
    pub fn from_input(id: i32, input: NoteIn) -> Self {
        Self {
            id,
            text: input.text,
            completed: input.completed,
        }
    }
}
