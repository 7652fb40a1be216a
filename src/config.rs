use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CONFIG_FILE: &str = "config.json";

/// Upper bound on `subscriber_capacity`; the broadcast buffer is allocated
/// up front at this size.
pub const MAX_SUBSCRIBER_CAPACITY: usize = 4096;

/// Tunables for a notes board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content given to a note created without text
    pub placeholder: String,
    /// New notes spawn at a random position in `[0, spawn_range)` on both axes
    pub spawn_range: f32,
    /// How many snapshots a subscriber may fall behind before it skips ahead
    pub subscriber_capacity: usize,
    /// File name of the SQLite database inside the board directory
    pub database: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            placeholder: "New Note".to_string(),
            spawn_range: 300.0,
            subscriber_capacity: 64,
            database: "notes.db".to_string(),
        }
    }
}

impl Config {
    /// Load `config.json` from the board directory, falling back to defaults
    /// when the file does not exist. Missing fields take their default value.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config.sanitized())
    }

    /// Replace values the store cannot work with by usable ones
    pub(crate) fn sanitized(mut self) -> Self {
        if !(self.spawn_range.is_finite() && self.spawn_range > 0.0) {
            self.spawn_range = Self::default().spawn_range;
        }
        self.subscriber_capacity = self.subscriber_capacity.clamp(1, MAX_SUBSCRIBER_CAPACITY);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.placeholder, "New Note");
        assert_eq!(config.spawn_range, 300.0);
        assert_eq!(config.database, "notes.db");
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"{"placeholder": "Untitled", "subscriber_capacity": 0}"#,
        )
        .unwrap();

        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.placeholder, "Untitled");
        assert_eq!(config.spawn_range, 300.0);
        assert_eq!(config.subscriber_capacity, 1);
    }

    #[test]
    fn test_huge_subscriber_capacity_is_clamped() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            format!(r#"{{"subscriber_capacity": {}}}"#, usize::MAX),
        )
        .unwrap();

        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.subscriber_capacity, MAX_SUBSCRIBER_CAPACITY);

        let config = Config {
            subscriber_capacity: MAX_SUBSCRIBER_CAPACITY + 1,
            ..Config::default()
        }
        .sanitized();
        assert_eq!(config.subscriber_capacity, MAX_SUBSCRIBER_CAPACITY);
    }

    #[test]
    fn test_load_invalid_json_errors() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "{not json").unwrap();
        assert!(Config::load(tmp.path()).is_err());
    }
}
