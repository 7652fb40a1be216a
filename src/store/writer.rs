//! Ordered persistence tail for the notes store.
//!
//! Jobs are applied in enqueue order by a single task. Whenever several jobs
//! are pending at once only the newest notes and background values are
//! written, since every job carries the full value for its key.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::entity::Background;
use crate::storage::NotesDataStore;

use super::Snapshot;

pub(crate) enum PersistJob {
    Notes(Arc<Snapshot>),
    Background(Background),
    Flush(oneshot::Sender<()>),
}

/// Start the writer task. It exits once every sender is dropped and the
/// queue has drained.
pub(crate) fn spawn_writer(data_store: NotesDataStore) -> mpsc::UnboundedSender<PersistJob> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_writer(data_store, rx));
    tx
}

async fn run_writer(data_store: NotesDataStore, mut rx: mpsc::UnboundedReceiver<PersistJob>) {
    while let Some(first) = rx.recv().await {
        let mut notes = None;
        let mut background = None;
        let mut waiters = Vec::new();

        let mut next = Some(first);
        while let Some(job) = next {
            match job {
                PersistJob::Notes(snapshot) => notes = Some(snapshot),
                PersistJob::Background(value) => background = Some(value),
                PersistJob::Flush(waiter) => waiters.push(waiter),
            }
            next = rx.try_recv().ok();
        }

        if let Some(snapshot) = notes {
            if let Err(e) = data_store.save_notes(&snapshot.notes).await {
                tracing::error!(
                    revision = snapshot.revision,
                    error = %e,
                    "failed to persist notes"
                );
            }
        }

        if let Some(background) = background {
            if let Err(e) = data_store.save_background(&background).await {
                tracing::error!(background = %background, error = %e, "failed to persist background");
            }
        }

        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    tracing::debug!("persistence writer stopped");
}
