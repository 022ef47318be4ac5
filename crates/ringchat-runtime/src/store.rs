//! Durable message store
//!
//! JSON Lines file, one chat message per line. `append` flushes before
//! returning, so an entry the core considers accepted is on disk; `load`
//! reads the whole file at startup and tolerates corrupt lines rather than
//! refusing to start.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use ringchat_core::{ChatEntry, LogStore};

use crate::errors::{Result, RuntimeError};

// ----------------------------------------------------------------------------
// File Log Store
// ----------------------------------------------------------------------------

/// Append-only [`LogStore`] backed by a JSON Lines file.
pub struct FileLogStore {
    path: PathBuf,
    file: File,
}

impl FileLogStore {
    /// Open (creating if needed) the store file and its parent directory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(RuntimeError::StoreSetup)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(RuntimeError::StoreSetup)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogStore for FileLogStore {
    fn load(&mut self) -> io::Result<Vec<ChatEntry>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut entries = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ChatEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(line = line_no + 1, error = %err, "skipping corrupt store line");
                }
            }
        }
        Ok(entries)
    }

    fn append(&mut self, entry: &ChatEntry) -> io::Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringchat_core::ChatLog;

    fn entry(index: u64) -> ChatEntry {
        ChatEntry {
            sender_name: "alice".into(),
            message: format!("message {index}"),
            index,
        }
    }

    #[test]
    fn appends_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice.jsonl");

        let mut store = FileLogStore::open(&path).unwrap();
        store.append(&entry(0)).unwrap();
        store.append(&entry(1)).unwrap();
        store.append(&entry(3)).unwrap();

        let mut reopened = FileLogStore::open(&path).unwrap();
        let loaded = reopened.load().unwrap();
        let indexes: Vec<u64> = loaded.iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![0, 1, 3]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileLogStore::open(dir.path().join("fresh.jsonl")).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_lines_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice.jsonl");

        let mut store = FileLogStore::open(&path).unwrap();
        store.append(&entry(0)).unwrap();
        fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"{ not json\n")
            .unwrap();
        store.append(&entry(1)).unwrap();

        let loaded = store.load().unwrap();
        let indexes: Vec<u64> = loaded.iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![0, 1]);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/alice.jsonl");
        let store = FileLogStore::open(&nested).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn chat_log_seeds_from_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice.jsonl");

        let mut store = FileLogStore::open(&path).unwrap();
        for i in [0, 1, 4] {
            store.append(&entry(i)).unwrap();
        }

        let log = ChatLog::open(Box::new(FileLogStore::open(&path).unwrap()));
        assert_eq!(log.len(), 3);
        assert_eq!(log.max_index(), Some(4));
        assert_eq!(log.find_gaps(), vec![2, 3]);
    }
}
