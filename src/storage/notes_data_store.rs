use std::sync::Arc;

use tokio::sync::watch;

use crate::entity::{Background, Color, Note};
use crate::error::{PostitError, Result};

use super::Preferences;

pub const NOTES_KEY: &str = "notes";
pub const BACKGROUND_TYPE_KEY: &str = "background_type";
pub const BACKGROUND_COLOR_KEY: &str = "background_color";
pub const BACKGROUND_IMAGE_KEY: &str = "background_image";

/// Everything the adapter persists, as last written
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersistedState {
    pub notes: Vec<Note>,
    pub background: Background,
}

/// Reads and writes the notes collection and background setting on top of a
/// [`Preferences`] store.
///
/// Malformed persisted data never surfaces as an error: a notes value that
/// does not parse loads as an empty collection and an unusable background
/// loads as the default. Only failures of the underlying store are returned.
#[derive(Clone)]
pub struct NotesDataStore {
    prefs: Arc<dyn Preferences>,
    state: Arc<watch::Sender<PersistedState>>,
}

impl NotesDataStore {
    /// Wrap a preferences store, reading its current contents so that
    /// [`observe`](Self::observe) starts from the persisted value.
    pub async fn open(prefs: Arc<dyn Preferences>) -> Result<Self> {
        let notes = read_notes(prefs.clone()).await?;
        let background = read_background(prefs.clone()).await?;
        let (state, _) = watch::channel(PersistedState { notes, background });

        Ok(Self {
            prefs,
            state: Arc::new(state),
        })
    }

    pub async fn load_notes(&self) -> Result<Vec<Note>> {
        read_notes(self.prefs.clone()).await
    }

    /// Overwrite the stored collection with `notes`. A note with a non-finite
    /// coordinate is rejected and the stored value is left as it was.
    pub async fn save_notes(&self, notes: &[Note]) -> Result<()> {
        if let Some(note) = notes.iter().find(|n| !n.position.is_finite()) {
            return Err(PostitError::Storage(format!(
                "note {} has a non-finite position ({}, {})",
                note.id, note.position.x, note.position.y
            )));
        }

        let encoded = serde_json::to_string(notes)?;
        let prefs = self.prefs.clone();
        blocking(move || prefs.edit(&[(NOTES_KEY, encoded)])).await?;

        tracing::trace!(count = notes.len(), "saved notes");
        let notes = notes.to_vec();
        self.state.send_modify(|state| state.notes = notes);
        Ok(())
    }

    pub async fn load_background(&self) -> Result<Background> {
        read_background(self.prefs.clone()).await
    }

    /// Write the discriminator and its value key. The other value key is left
    /// untouched; the discriminator decides which one is read back.
    pub async fn save_background(&self, background: &Background) -> Result<()> {
        let mut entries = vec![(BACKGROUND_TYPE_KEY, background.kind().to_string())];
        match background {
            Background::SolidColor { color } => {
                entries.push((BACKGROUND_COLOR_KEY, color.0.to_string()));
            }
            Background::ImageReference { uri } => {
                entries.push((BACKGROUND_IMAGE_KEY, uri.clone()));
            }
        }

        let prefs = self.prefs.clone();
        blocking(move || prefs.edit(&entries)).await?;

        tracing::trace!(background = %background, "saved background");
        let background = background.clone();
        self.state
            .send_modify(|state| state.background = background);
        Ok(())
    }

    /// Live view of the persisted notes and background, updated after every
    /// successful write through this adapter or any of its clones.
    pub fn observe(&self) -> watch::Receiver<PersistedState> {
        self.state.subscribe()
    }
}

async fn read_notes(prefs: Arc<dyn Preferences>) -> Result<Vec<Note>> {
    let raw = blocking(move || prefs.get(NOTES_KEY)).await?;
    Ok(raw.map(|raw| decode_notes(&raw)).unwrap_or_default())
}

fn decode_notes(raw: &str) -> Vec<Note> {
    match serde_json::from_str::<Vec<Note>>(raw) {
        Ok(notes) => notes,
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed notes data");
            Vec::new()
        }
    }
}

async fn read_background(prefs: Arc<dyn Preferences>) -> Result<Background> {
    blocking(move || {
        let kind = prefs.get(BACKGROUND_TYPE_KEY)?;
        let background = match kind.as_deref() {
            Some("image") => prefs.get(BACKGROUND_IMAGE_KEY)?.map(Background::image),
            Some("color") | None => prefs
                .get(BACKGROUND_COLOR_KEY)?
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .map(|value| Background::solid(Color(value))),
            Some(other) => {
                tracing::warn!(kind = other, "unknown background type, using default");
                None
            }
        };
        Ok(background.unwrap_or_default())
    })
    .await
}

/// Run a durable-store call off the async worker threads
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PostitError::Storage(format!("storage task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{NoteId, Position};
    use crate::storage::{MemoryPreferences, SqlitePreferences};
    use tempfile::TempDir;

    fn note(id: &str, content: &str, x: f32, y: f32, color: i64) -> Note {
        Note {
            id: NoteId::from(id),
            content: content.to_string(),
            position: Position::new(x, y),
            color: Color(color),
        }
    }

    async fn memory_store() -> (Arc<MemoryPreferences>, NotesDataStore) {
        let prefs = Arc::new(MemoryPreferences::new());
        let store = NotesDataStore::open(prefs.clone()).await.unwrap();
        (prefs, store)
    }

    #[tokio::test]
    async fn test_empty_store_loads_defaults() {
        let (_prefs, store) = memory_store().await;
        assert!(store.load_notes().await.unwrap().is_empty());
        assert_eq!(store.load_background().await.unwrap(), Background::default());
    }

    #[tokio::test]
    async fn test_notes_round_trip_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.db");
        let notes = vec![
            note("b", "second letter first", 10.0, 20.0, 0xFFFF_B3BA),
            note("a", "", -5.5, 1e6, 0xFFBA_E1FF),
            note("c", "multi\nline ✓", 0.0, 0.0, 0xFFB3_FFE6),
        ];

        {
            let prefs = Arc::new(SqlitePreferences::open(&path).unwrap());
            let store = NotesDataStore::open(prefs).await.unwrap();
            store.save_notes(&notes).await.unwrap();
        }

        let prefs = Arc::new(SqlitePreferences::open(&path).unwrap());
        let store = NotesDataStore::open(prefs).await.unwrap();
        assert_eq!(store.load_notes().await.unwrap(), notes);
    }

    #[tokio::test]
    async fn test_non_finite_position_is_not_persisted() {
        let (_prefs, store) = memory_store().await;
        let good = vec![note("a", "keep me", 1.0, 2.0, 0xFFFF_B3BA)];
        store.save_notes(&good).await.unwrap();

        for (x, y) in [(f32::INFINITY, 0.0), (0.0, f32::NEG_INFINITY), (f32::NAN, 1.0)] {
            let bad = vec![good[0].clone(), note("b", "and me", x, y, 0xFFBA_E1FF)];
            let result = store.save_notes(&bad).await;
            assert!(matches!(result, Err(PostitError::Storage(_))));
            assert_eq!(store.load_notes().await.unwrap(), good);
            assert_eq!(store.observe().borrow().notes, good);
        }
    }

    #[tokio::test]
    async fn test_malformed_notes_load_as_empty() {
        let (prefs, store) = memory_store().await;

        for garbage in ["", "not json", "{\"id\":1}", "[{\"id\":\"x\"}]", "[1,2,3"] {
            prefs.edit(&[(NOTES_KEY, garbage.to_string())]).unwrap();
            assert!(store.load_notes().await.unwrap().is_empty(), "{garbage}");
        }
    }

    #[tokio::test]
    async fn test_open_over_malformed_data_starts_empty() {
        let prefs = Arc::new(MemoryPreferences::new());
        prefs.edit(&[(NOTES_KEY, "[oops".to_string())]).unwrap();

        let store = NotesDataStore::open(prefs).await.unwrap();
        assert!(store.observe().borrow().notes.is_empty());
    }

    #[tokio::test]
    async fn test_background_switching_with_stale_keys() {
        let (prefs, store) = memory_store().await;

        store
            .save_background(&Background::image("file://x"))
            .await
            .unwrap();
        assert_eq!(
            store.load_background().await.unwrap(),
            Background::image("file://x")
        );

        store
            .save_background(&Background::solid(Color(0xFF00_FF00)))
            .await
            .unwrap();
        assert_eq!(
            store.load_background().await.unwrap(),
            Background::solid(Color(0xFF00_FF00))
        );
        // the image key is stale but still present
        assert_eq!(
            prefs.get(BACKGROUND_IMAGE_KEY).unwrap().as_deref(),
            Some("file://x")
        );

        store
            .save_background(&Background::image("file://y"))
            .await
            .unwrap();
        assert_eq!(
            store.load_background().await.unwrap(),
            Background::image("file://y")
        );
        assert_eq!(
            prefs.get(BACKGROUND_COLOR_KEY).unwrap().as_deref(),
            Some("4278255360")
        );
    }

    #[tokio::test]
    async fn test_background_fallbacks() {
        let (prefs, store) = memory_store().await;

        // discriminator without its value key
        prefs
            .edit(&[(BACKGROUND_TYPE_KEY, "image".to_string())])
            .unwrap();
        assert_eq!(store.load_background().await.unwrap(), Background::default());

        // unknown discriminator
        prefs
            .edit(&[
                (BACKGROUND_TYPE_KEY, "gradient".to_string()),
                (BACKGROUND_COLOR_KEY, "4278255360".to_string()),
            ])
            .unwrap();
        assert_eq!(store.load_background().await.unwrap(), Background::default());

        // unparseable color
        prefs
            .edit(&[
                (BACKGROUND_TYPE_KEY, "color".to_string()),
                (BACKGROUND_COLOR_KEY, "blue".to_string()),
            ])
            .unwrap();
        assert_eq!(store.load_background().await.unwrap(), Background::default());
    }

    #[tokio::test]
    async fn test_color_without_discriminator_is_used() {
        let (prefs, store) = memory_store().await;
        prefs
            .edit(&[(BACKGROUND_COLOR_KEY, "4293980400".to_string())])
            .unwrap();
        assert_eq!(
            store.load_background().await.unwrap(),
            Background::solid(Color(0xFFF0_F0F0))
        );
    }

    #[tokio::test]
    async fn test_observe_reflects_writes() {
        let (_prefs, store) = memory_store().await;
        let mut rx = store.observe();
        assert!(rx.borrow().notes.is_empty());

        let notes = vec![note("a", "hello", 1.0, 2.0, 0xFFFF_FFBA)];
        store.save_notes(&notes).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().notes, notes);

        store
            .save_background(&Background::image("content://img/1"))
            .await
            .unwrap();
        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.notes, notes);
        assert_eq!(state.background, Background::image("content://img/1"));
    }

    #[tokio::test]
    async fn test_write_failure_propagates_and_keeps_observed_state() {
        let (prefs, store) = memory_store().await;
        prefs.set_read_only(true);

        let result = store.save_notes(&[note("a", "x", 0.0, 0.0, 1)]).await;
        assert!(matches!(result, Err(PostitError::Storage(_))));
        assert!(store.observe().borrow().notes.is_empty());
    }
}
