//! Append-only shuffle history.
//!
//! The history is a single JSON document of the form
//! `{"shuffle_history": [{"shuffled_sequence": [..]}, ..]}`. Every append
//! reads the whole document, pushes one entry and writes the whole document
//! back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::error::{Result, ShuffleError};

pub const LOG_FILE_NAME: &str = "log.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub shuffled_sequence: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    pub shuffle_history: Vec<HistoryEntry>,
    /// Unknown top-level keys, carried through rewrites untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Persistent store for shuffle results.
pub trait HistoryStore: Send + Sync {
    /// Appends one entry holding `sequence`.
    fn append(&self, sequence: &[u64]) -> Result<()>;

    /// Returns every recorded entry in insertion order.
    fn entries(&self) -> Result<Vec<HistoryEntry>>;

    /// Cheap reachability probe used by the health endpoint.
    fn check(&self) -> Result<()> {
        self.entries().map(|_| ())
    }
}

/// History kept in a JSON file on disk.
pub struct JsonFileHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `log.json` next to the running executable.
    pub fn default_path() -> io::Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(dir.join(LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the log with an empty history if it does not exist yet.
    /// An existing log is never touched.
    pub fn ensure_exists(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                let contents = serde_json::to_vec(&HistoryLog::default())
                    .map_err(|e| ShuffleError::CorruptLog(e.to_string()))?;
                file.write_all(&contents)?;
                file.sync_all()?;
                tracing::info!(path = %self.path.display(), "Created shuffle history log");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> Result<HistoryLog> {
        let data = fs::read(&self.path)?;
        serde_json::from_slice(&data).map_err(|e| ShuffleError::CorruptLog(e.to_string()))
    }

    /// Writes to a sibling temp file then renames it over the log.
    fn persist(&self, log: &HistoryLog) -> Result<()> {
        let contents =
            serde_json::to_vec(log).map_err(|e| ShuffleError::CorruptLog(e.to_string()))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&contents)?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl HistoryStore for JsonFileHistory {
    fn append(&self, sequence: &[u64]) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| ShuffleError::LockPoisoned)?;

        self.ensure_exists()?;
        let mut log = self.load()?;
        log.shuffle_history.push(HistoryEntry {
            shuffled_sequence: sequence.to_vec(),
        });
        self.persist(&log)?;

        tracing::debug!(
            path = %self.path.display(),
            entries = log.shuffle_history.len(),
            "Appended shuffle to history"
        );
        Ok(())
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Ok(self.load()?.shuffle_history)
    }
}

/// History kept in memory, lost on restart.
#[derive(Default)]
pub struct InMemoryHistory {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistory {
    fn append(&self, sequence: &[u64]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| ShuffleError::LockPoisoned)?;
        entries.push(HistoryEntry {
            shuffled_sequence: sequence.to_vec(),
        });
        Ok(())
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>> {
        let entries = self.entries.read().map_err(|_| ShuffleError::LockPoisoned)?;
        Ok(entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn temp_log() -> (tempfile::TempDir, JsonFileHistory) {
        let dir = tempfile::tempdir().unwrap();
        let history = JsonFileHistory::new(dir.path().join(LOG_FILE_NAME));
        (dir, history)
    }

    #[test]
    fn test_log_created_on_first_append() {
        let (_dir, history) = temp_log();
        assert!(!history.path().exists());

        history.append(&[2, 1, 3]).unwrap();

        let raw: Value = serde_json::from_slice(&fs::read(history.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"shuffle_history": [{"shuffled_sequence": [2, 1, 3]}]})
        );
    }

    #[test]
    fn test_ensure_exists_writes_empty_history() {
        let (_dir, history) = temp_log();
        history.ensure_exists().unwrap();

        let raw = fs::read_to_string(history.path()).unwrap();
        assert_eq!(raw, r#"{"shuffle_history":[]}"#);
    }

    #[test]
    fn test_ensure_exists_is_idempotent() {
        let (_dir, history) = temp_log();
        history.append(&[1]).unwrap();
        history.append(&[2, 1]).unwrap();

        history.ensure_exists().unwrap();
        history.ensure_exists().unwrap();

        let entries = history.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].shuffled_sequence, vec![2, 1]);
    }

    #[test]
    fn test_append_preserves_order() {
        let (_dir, history) = temp_log();
        for n in 1..=5u64 {
            history.append(&(1..=n).collect::<Vec<_>>()).unwrap();
        }
        let lengths: Vec<usize> = history
            .entries()
            .unwrap()
            .iter()
            .map(|e| e.shuffled_sequence.len())
            .collect();
        assert_eq!(lengths, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_corrupt_log_is_reported_and_left_alone() {
        let (_dir, history) = temp_log();
        fs::write(history.path(), "not json").unwrap();

        assert!(matches!(history.append(&[1]), Err(ShuffleError::CorruptLog(_))));
        assert_eq!(fs::read_to_string(history.path()).unwrap(), "not json");
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let (_dir, history) = temp_log();
        fs::write(history.path(), r#"{"history": []}"#).unwrap();
        assert!(matches!(history.append(&[1]), Err(ShuffleError::CorruptLog(_))));
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let (_dir, history) = temp_log();
        fs::write(history.path(), r#"{"shuffle_history": [], "owner": "dj"}"#).unwrap();

        history.append(&[1, 2]).unwrap();

        let raw: Value = serde_json::from_slice(&fs::read(history.path()).unwrap()).unwrap();
        assert_eq!(raw["owner"], "dj");
        assert_eq!(raw["shuffle_history"][0]["shuffled_sequence"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let (_dir, history) = temp_log();
        let history = Arc::new(history);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let history = Arc::clone(&history);
                thread::spawn(move || {
                    for _ in 0..10 {
                        history.append(&[i]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(history.entries().unwrap().len(), 80);
    }

    #[test]
    fn test_in_memory_history() {
        let history = InMemoryHistory::new();
        history.append(&[3, 1, 2]).unwrap();
        assert_eq!(
            history.entries().unwrap(),
            vec![HistoryEntry {
                shuffled_sequence: vec![3, 1, 2]
            }]
        );
        assert!(history.check().is_ok());
    }
}
