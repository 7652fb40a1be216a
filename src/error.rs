use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostitError {
    #[error("Not in a postit board. Run 'postit init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .postit/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Ambiguous note id '{0}' matches more than one note")]
    AmbiguousId(String),

    #[error("Invalid position: ({0}, {1}) must be finite")]
    InvalidPosition(f32, f32),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Notes store is closed")]
    StoreClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, PostitError>;
