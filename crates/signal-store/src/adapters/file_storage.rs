//! # File-Backed Storage
//!
//! Durable `StorageBackend` keeping one file per key inside a directory.
//!
//! ## Layout
//!
//! ```text
//! <dir>/
//! ├── LOCK            # exclusive flock held while the storage is open
//! ├── counter.json    # value stored under key "counter"
//! └── cart.json
//! ```
//!
//! Writes go to a temporary file that is renamed over the target, so a crash
//! mid-write leaves either the old or the new value, never a torn one.
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).

use crate::error::StorageError;
use crate::ports::StorageBackend;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const LOCK_FILE: &str = "LOCK";
const VALUE_EXT: &str = "json";
const TEMP_EXT: &str = "json.tmp";

/// Directory-backed key/value storage.
///
/// Only one `FileStorage` may have a directory open at a time; a second
/// `open` fails with `StorageError::Locked` until the first is dropped.
pub struct FileStorage {
    dir: PathBuf,
    lock: File,
}

impl FileStorage {
    /// Open (creating if needed) the storage directory and lock it.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE))?;

        if lock.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked {
                path: dir.display().to_string(),
            });
        }

        debug!(dir = %dir.display(), "File storage opened");
        Ok(Self { dir, lock })
    }

    /// Storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{VALUE_EXT}")))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.value_path(key)?;
        let temp = self.dir.join(format!("{key}.{TEMP_EXT}"));

        let mut file = File::create(&temp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.value_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        // Release flock; the LOCK file itself stays.
        let _ = self.lock.unlock();
    }
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let reason = if key.is_empty() {
        Some("key is empty")
    } else if key.contains(['/', '\\']) {
        Some("key contains a path separator")
    } else if key.starts_with('.') {
        Some("key starts with a dot")
    } else if key == LOCK_FILE {
        Some("key is reserved")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StorageError::InvalidKey {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
