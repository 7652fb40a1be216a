//! Persistent quick-access notice.
//!
//! The notice shows how many notes exist and offers one action, creating a
//! new note. Delivering it (a system notification, a tray item, a status
//! line) is up to the [`NoticeSink`] implementation.

use tokio::task::JoinHandle;

use crate::entity::NoteId;
use crate::store::NotesStore;

pub const NOTICE_TITLE: &str = "Post-it";
pub const NOTICE_ACTION: &str = "Add New Note";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub text: String,
    pub action: &'static str,
}

impl Notice {
    pub fn for_count(count: usize) -> Self {
        Self {
            title: NOTICE_TITLE,
            text: notice_text(count),
            action: NOTICE_ACTION,
        }
    }
}

pub fn notice_text(count: usize) -> String {
    match count {
        0 => "No notes yet".to_string(),
        1 => "1 note".to_string(),
        n => format!("{} notes in App", n),
    }
}

/// Receives the notice whenever its content changes.
pub trait NoticeSink: Send + Sync + 'static {
    fn show(&self, notice: &Notice);
}

/// Keep a sink up to date with the store's note count. Shows the current
/// notice right away, then again whenever the count changes. The task ends
/// when every store handle has been dropped.
pub fn spawn_notice_updater<S: NoticeSink>(store: &NotesStore, sink: S) -> JoinHandle<()> {
    let mut rx = store.watch();

    tokio::spawn(async move {
        let mut shown = rx.borrow_and_update().notes.len();
        sink.show(&Notice::for_count(shown));

        while rx.changed().await.is_ok() {
            let count = rx.borrow_and_update().notes.len();
            if count != shown {
                shown = count;
                sink.show(&Notice::for_count(count));
            }
        }

        tracing::debug!("notice updater stopped");
    })
}

/// A request to create a note from outside the canvas (the notice action or
/// a home-screen shortcut). Without prefilled text the note starts empty
/// rather than with the placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickNote {
    pub text: String,
}

impl QuickNote {
    pub fn new(text: Option<String>) -> Self {
        Self {
            text: text.unwrap_or_default(),
        }
    }

    /// Create the note and focus it so it can be typed into immediately.
    pub async fn submit(self, store: &NotesStore) -> NoteId {
        store.add_note(Some(self.text), true).await
    }
}
