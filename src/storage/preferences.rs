use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{PostitError, Result};

/// String-keyed durable store the notes adapter writes into.
///
/// `edit` must apply all entries atomically: either every key is written or
/// none is.
pub trait Preferences: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn edit(&self, entries: &[(&str, String)]) -> Result<()>;
}

/// SQLite-backed preferences, one row per key
pub struct SqlitePreferences {
    conn: Mutex<Connection>,
}

impl SqlitePreferences {
    /// Open or create the preferences database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        let prefs = Self {
            conn: Mutex::new(conn),
        };
        prefs.init_schema()?;
        Ok(prefs)
    }

    fn init_schema(&self) -> Result<()> {
        self.lock()?.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PostitError::Storage("preferences connection poisoned".to_string()))
    }
}

impl Preferences for SqlitePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .lock()?
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn edit(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// In-process preferences. Writes can be switched off to simulate an
/// unavailable disk.
#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
    read_only: AtomicBool,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `edit` fail with a storage error
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| PostitError::Storage("preferences map poisoned".to_string()))
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn edit(&self, entries: &[(&str, String)]) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(PostitError::Storage("preferences are read-only".to_string()));
        }
        let mut values = self.lock()?;
        for (key, value) in entries {
            values.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}
