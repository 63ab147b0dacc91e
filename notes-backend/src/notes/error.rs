use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("Note {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Store task failed: {0}")]
    Task(String),
}

impl NoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NoteError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, NoteError>;
