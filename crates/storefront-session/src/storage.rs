//! Persisted key-value storage backing the credential store.
//!
//! # Design
//! - Synchronous string get/set/remove, mirroring browser local storage.
//! - `FileStorage` keeps one JSON object per file and replaces it atomically.
//! - `MemoryStorage` is the non-durable variant for tests and throwaway clients.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;
use uuid::Uuid;

use crate::error::{SessionError, SessionResult};

/// Storage key holding the session credential.
pub const TOKEN_KEY: &str = "token";

/// Durable string key-value storage.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be read.
    fn get(&self, key: &str) -> SessionResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> SessionResult<()>;

    /// Remove `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn remove(&self, key: &str) -> SessionResult<()>;
}

/// JSON-file storage that survives process restarts.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Storage backed by the JSON file at `path`. The file is created lazily.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_entries(&self) -> SessionResult<BTreeMap<String, String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(SessionError::io("read", &self.path, err)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|err| SessionError::json("parse", &self.path, err))
    }

    // Writes replace an unparseable file instead of failing on it.
    fn entries_for_write(&self) -> SessionResult<BTreeMap<String, String>> {
        match self.read_entries() {
            Err(err @ SessionError::Json { .. }) => {
                warn!(error = %err, path = %self.path.display(), "replacing unreadable session file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> SessionResult<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| SessionError::io("create_dir", parent, err))?;
        }
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|err| SessionError::json("serialize", &self.path, err))?;

        let staging = self.staging_path();
        write_private(&staging, &bytes)
            .and_then(|()| fs::rename(&staging, &self.path))
            .map_err(|err| {
                let _ = fs::remove_file(&staging);
                SessionError::io("write", &self.path, err)
            })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        let _guard = self.guard();
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        let _guard = self.guard();
        let mut entries = self.entries_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> SessionResult<()> {
        let _guard = self.guard();
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(SessionError::Json { .. }) => {
                // Rewrite so the unreadable content (and any credential in it) is gone.
                let mut entries = self.entries_for_write()?;
                entries.remove(key);
                return self.write_entries(&entries);
            }
            Err(err) => return Err(err),
        };
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

// Session files hold bearer credentials; keep them owner-readable only.
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// In-process storage; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> SessionResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}
