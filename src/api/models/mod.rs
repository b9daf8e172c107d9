// Models module - contains Note, User and the wire schemas around them

pub mod note;
pub mod user;

pub use note::{Note, NoteIn};
pub use user::{Token, UserIn, UserOut, UserRecord};
