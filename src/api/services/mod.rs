//! Services module - contains the business logic behind the routes.

pub mod cache_service;
pub mod jwt_service;
pub mod note_service;
pub mod password_service;

// Re-export for convenience
pub use cache_service::{MemoryNoteCache, NoopCache, NoteCache, RedisNoteCache, SharedNoteCache};
pub use jwt_service::{AuthError, Claims, JwtService, SharedJwtService};
pub use note_service::NoteService;
pub use password_service::PasswordService;
