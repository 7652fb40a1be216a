pub mod board;
pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod notice;
pub mod storage;
pub mod store;

pub use board::Board;
pub use config::Config;
pub use entity::{Background, Color, Note, NoteId, Position};
pub use error::{PostitError, Result};
pub use storage::{MemoryPreferences, NotesDataStore, Preferences, SqlitePreferences};
pub use store::{NotesStore, Snapshot, Subscription};
