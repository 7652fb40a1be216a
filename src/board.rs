use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{PostitError, Result};
use crate::storage::{NotesDataStore, SqlitePreferences};
use crate::store::NotesStore;

pub const POSTIT_DIR: &str = ".postit";

/// A notes board on disk: the `.postit/` directory holding the preferences
/// database and an optional `config.json`.
#[derive(Debug, Clone)]
pub struct Board {
    dir: PathBuf,
    config: Config,
}

impl Board {
    /// Create a new board under `root`
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(POSTIT_DIR);

        if dir.exists() {
            return Err(PostitError::AlreadyInitialized);
        }

        fs::create_dir_all(&dir)?;
        let config = Config::default();

        // create the database so `open` finds it
        SqlitePreferences::open(&dir.join(&config.database))?;
        tracing::info!(dir = %dir.display(), "initialized board");

        Ok(Self { dir, config })
    }

    /// Open an existing board under `root`
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(POSTIT_DIR);

        if !dir.is_dir() {
            return Err(PostitError::NotInitialized);
        }

        let config = Config::load(&dir)?;
        Ok(Self { dir, config })
    }

    /// Find the board root by looking for `.postit/` in `start` and its
    /// ancestors. Falls back to `start` itself.
    pub fn find_root(start: &Path) -> PathBuf {
        let mut current = start;
        loop {
            if current.join(POSTIT_DIR).is_dir() {
                return current.to_path_buf();
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return start.to_path_buf(),
            }
        }
    }

    /// Open the board for the current working directory
    pub fn discover() -> Result<Self> {
        let cwd = env::current_dir()?;
        Self::open(&Self::find_root(&cwd))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database_path(&self) -> PathBuf {
        self.dir.join(&self.config.database)
    }

    /// Open the notes store backed by this board's database
    pub async fn open_store(&self) -> Result<NotesStore> {
        let prefs = Arc::new(SqlitePreferences::open(&self.database_path())?);
        let data_store = NotesDataStore::open(prefs).await?;
        NotesStore::open(data_store, self.config.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_board_directory() {
        let tmp = TempDir::new().unwrap();
        let board = Board::init(tmp.path()).unwrap();

        assert!(tmp.path().join(".postit").is_dir());
        assert!(board.database_path().exists());
    }

    #[test]
    fn test_init_fails_if_already_initialized() {
        let tmp = TempDir::new().unwrap();
        Board::init(tmp.path()).unwrap();

        let result = Board::init(tmp.path());
        assert!(matches!(result, Err(PostitError::AlreadyInitialized)));
    }

    #[test]
    fn test_open_fails_if_not_initialized() {
        let tmp = TempDir::new().unwrap();

        let result = Board::open(tmp.path());
        assert!(matches!(result, Err(PostitError::NotInitialized)));
    }

    #[test]
    fn test_find_root_walks_up() {
        let tmp = TempDir::new().unwrap();
        Board::init(tmp.path()).unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(Board::find_root(&nested), tmp.path().to_path_buf());
    }

    #[test]
    fn test_open_reads_config() {
        let tmp = TempDir::new().unwrap();
        Board::init(tmp.path()).unwrap();
        fs::write(
            tmp.path().join(".postit/config.json"),
            r#"{"placeholder": "Todo"}"#,
        )
        .unwrap();

        let board = Board::open(tmp.path()).unwrap();
        assert_eq!(board.config().placeholder, "Todo");
    }

    #[tokio::test]
    async fn test_store_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let board = Board::init(tmp.path()).unwrap();

        {
            let store = board.open_store().await.unwrap();
            store.add_note(Some("Use Rust".to_string()), false).await;
            store.flush().await.unwrap();
        }

        let board = Board::open(tmp.path()).unwrap();
        let store = board.open_store().await.unwrap();
        let notes = store.notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "Use Rust");
    }
}
