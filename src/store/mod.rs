//! The note-collection state store.
//!
//! [`NotesStore`] is the only writer of the notes collection, the background
//! and the focused note. Every mutation runs under a single async lock: it
//! computes the next [`Snapshot`], replaces the current one, queues the
//! persistence write and publishes the snapshot to subscribers before the
//! lock is released. Persistence completes in the background; call
//! [`NotesStore::flush`] to wait for it.
//!
//! Mutations that name an unknown note are silent no-ops and publish
//! nothing.

mod writer;

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};

use crate::config::Config;
use crate::entity::{Background, Color, Note, NoteId, Position, NOTE_COLORS};
use crate::error::{PostitError, Result};
use crate::storage::{NotesDataStore, PersistedState};
use writer::PersistJob;

/// The full observable state at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// Increases by one with every published snapshot
    pub revision: u64,
    pub notes: Vec<Note>,
    pub background: Background,
    pub focused: Option<NoteId>,
}

impl Snapshot {
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }
}

/// What a mutation changed, and therefore what has to be persisted.
enum Dirty {
    Nothing,
    Focus,
    Notes,
    Background,
}

struct Inner {
    state: Mutex<Arc<Snapshot>>,
    current: watch::Sender<Arc<Snapshot>>,
    events: broadcast::Sender<Arc<Snapshot>>,
    persist: mpsc::UnboundedSender<PersistJob>,
    data_store: NotesDataStore,
    config: Config,
}

/// Handle to the notes store. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct NotesStore {
    inner: Arc<Inner>,
}

impl NotesStore {
    /// Start from the notes and background the adapter read when it was
    /// opened, and start the persistence writer. Must be called from within
    /// a tokio runtime.
    pub async fn open(data_store: NotesDataStore, config: Config) -> Result<Self> {
        let config = config.sanitized();
        let PersistedState { notes, background } = data_store.observe().borrow().clone();
        tracing::debug!(notes = notes.len(), background = %background, "opened notes store");

        let initial = Arc::new(Snapshot {
            revision: 0,
            notes,
            background,
            focused: None,
        });

        let (current, _) = watch::channel(initial.clone());
        let (events, _) = broadcast::channel(config.subscriber_capacity);
        let persist = writer::spawn_writer(data_store.clone());

        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(initial),
                current,
                events,
                persist,
                data_store,
                config,
            }),
        })
    }

    /// The persistence adapter behind this store, for readers that want the
    /// durable view rather than the in-memory one.
    pub fn data_store(&self) -> &NotesDataStore {
        &self.inner.data_store
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.current.borrow().clone()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.snapshot().notes.clone()
    }

    pub fn background(&self) -> Background {
        self.snapshot().background.clone()
    }

    pub fn focused(&self) -> Option<NoteId> {
        self.snapshot().focused.clone()
    }

    /// Receive snapshots published from now on, in mutation order. Delivery
    /// is lossy: see [`Subscription`].
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.inner.events.subscribe(),
        }
    }

    /// Latest-value view of the store, for readers that only care about the
    /// current state.
    pub fn watch(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.current.subscribe()
    }

    /// Append a note. `None` content uses the configured placeholder text.
    /// With `auto_focus` the new note also takes input focus.
    pub async fn add_note(&self, content: Option<String>, auto_focus: bool) -> NoteId {
        let mut note = self.spawn_note(content);

        self.apply(|snapshot| {
            while snapshot.note(&note.id).is_some() {
                note.id = NoteId::generate();
            }
            let id = note.id.clone();
            tracing::debug!(id = %id, "note added");
            snapshot.notes.push(note);
            if auto_focus {
                snapshot.focused = Some(id.clone());
            }
            (Dirty::Notes, id)
        })
        .await
    }

    pub async fn update_position(&self, id: &NoteId, x: f32, y: f32) {
        self.apply(|snapshot| {
            edit_note(snapshot, id, |note| note.position = Position::new(x, y))
        })
        .await
    }

    pub async fn update_content(&self, id: &NoteId, content: impl Into<String>) {
        let content = content.into();
        self.apply(|snapshot| edit_note(snapshot, id, |note| note.content = content))
            .await
    }

    pub async fn update_color(&self, id: &NoteId, color: Color) {
        self.apply(|snapshot| edit_note(snapshot, id, |note| note.color = color))
            .await
    }

    /// Remove a note. Focus is cleared when the removed note held it.
    pub async fn delete_note(&self, id: &NoteId) {
        self.apply(|snapshot| {
            let before = snapshot.notes.len();
            snapshot.notes.retain(|n| &n.id != id);
            if snapshot.notes.len() == before {
                return (Dirty::Nothing, ());
            }
            if snapshot.focused.as_ref() == Some(id) {
                snapshot.focused = None;
            }
            tracing::debug!(id = %id, "note deleted");
            (Dirty::Notes, ())
        })
        .await
    }

    pub async fn update_background_color(&self, color: Color) {
        self.set_background(Background::solid(color)).await
    }

    pub async fn update_background_image(&self, uri: impl Into<String>) {
        self.set_background(Background::image(uri)).await
    }

    async fn set_background(&self, background: Background) {
        self.apply(|snapshot| {
            snapshot.background = background;
            (Dirty::Background, ())
        })
        .await
    }

    /// Give input focus to a note, taking it from any other note.
    pub async fn set_focus(&self, id: &NoteId) {
        self.apply(|snapshot| {
            if snapshot.focused.as_ref() == Some(id) || snapshot.note(id).is_none() {
                return (Dirty::Nothing, ());
            }
            snapshot.focused = Some(id.clone());
            (Dirty::Focus, ())
        })
        .await
    }

    pub async fn clear_focus(&self) {
        self.apply(|snapshot| match snapshot.focused.take() {
            Some(_) => (Dirty::Focus, ()),
            None => (Dirty::Nothing, ()),
        })
        .await
    }

    /// Wait until every persistence write queued so far has completed.
    /// Write failures are logged by the writer, not reported here.
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .persist
            .send(PersistJob::Flush(tx))
            .map_err(|_| PostitError::StoreClosed)?;
        rx.await.map_err(|_| PostitError::StoreClosed)
    }

    fn spawn_note(&self, content: Option<String>) -> Note {
        let mut rng = rand::thread_rng();
        let range = self.inner.config.spawn_range;
        let mut coordinate = || {
            if range.is_finite() && range > 0.0 {
                rng.gen_range(0.0..range)
            } else {
                0.0
            }
        };
        let position = Position::new(coordinate(), coordinate());
        let color = NOTE_COLORS
            .choose(&mut rng)
            .copied()
            .unwrap_or(NOTE_COLORS[0]);
        let content = content.unwrap_or_else(|| self.inner.config.placeholder.clone());

        Note::new(content, position, color)
    }

    /// Run one serialized mutation. The closure edits a copy of the current
    /// snapshot and reports what it changed; unchanged snapshots are dropped.
    async fn apply<T>(&self, mutation: impl FnOnce(&mut Snapshot) -> (Dirty, T)) -> T {
        let mut state = self.inner.state.lock().await;

        let mut next = Snapshot::clone(&state);
        let (dirty, output) = mutation(&mut next);
        if matches!(dirty, Dirty::Nothing) {
            return output;
        }

        next.revision += 1;
        let next = Arc::new(next);
        *state = next.clone();

        let job = match dirty {
            Dirty::Notes => Some(PersistJob::Notes(next.clone())),
            Dirty::Background => Some(PersistJob::Background(next.background.clone())),
            Dirty::Focus | Dirty::Nothing => None,
        };
        if let Some(job) = job {
            if self.inner.persist.send(job).is_err() {
                tracing::error!(revision = next.revision, "persistence writer is gone");
            }
        }

        self.inner.current.send_replace(next.clone());
        // no subscribers is fine
        let _ = self.inner.events.send(next);
        output
    }
}

fn edit_note(snapshot: &mut Snapshot, id: &NoteId, edit: impl FnOnce(&mut Note)) -> (Dirty, ()) {
    match snapshot.notes.iter_mut().find(|n| &n.id == id) {
        Some(note) => {
            edit(note);
            (Dirty::Notes, ())
        }
        None => (Dirty::Nothing, ()),
    }
}

/// Stream of snapshots published by a [`NotesStore`].
///
/// Each subscription buffers at most `subscriber_capacity` snapshots. A
/// subscriber that falls further behind loses the oldest ones and resumes
/// from the oldest snapshot still buffered, so consumers must not rely on
/// seeing every revision. Every snapshot carries the full state and
/// [`NotesStore::watch`] always holds the latest one.
pub struct Subscription {
    rx: broadcast::Receiver<Arc<Snapshot>>,
}

impl Subscription {
    /// Next published snapshot, or `None` once every store handle is gone.
    /// Snapshots dropped while lagging are skipped, not replayed.
    pub async fn next(&mut self) -> Option<Arc<Snapshot>> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, skipping snapshots");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`next`](Self::next)
    pub fn try_next(&mut self) -> Option<Arc<Snapshot>> {
        use tokio::sync::broadcast::error::TryRecvError;
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, skipping snapshots");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
