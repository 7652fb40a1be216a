mod notes_data_store;
mod preferences;

pub use notes_data_store::{
    NotesDataStore, PersistedState, BACKGROUND_COLOR_KEY, BACKGROUND_IMAGE_KEY,
    BACKGROUND_TYPE_KEY, NOTES_KEY,
};
pub use preferences::{MemoryPreferences, Preferences, SqlitePreferences};
