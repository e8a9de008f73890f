use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::JourneyError;

/// Durable key/value store holding serialized cache and progress rows.
///
/// Writes are last-writer-wins; there is no cross-process locking.
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Read the row stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<String>, JourneyError>;

    /// Replace the row stored under `key`.
    async fn store(&self, key: &str, value: &str) -> Result<(), JourneyError>;

    /// Delete the row under `key`. Deleting a missing row succeeds.
    async fn remove(&self, key: &str) -> Result<(), JourneyError>;
}

/// Process-local backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rows: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    /// True when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }

    /// Whether a row exists under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.rows.lock().await.contains_key(key)
    }
}

#[async_trait]
impl StateBackend for MemoryBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, JourneyError> {
        Ok(self.rows.lock().await.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> Result<(), JourneyError> {
        self.rows
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), JourneyError> {
        self.rows.lock().await.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Keys are mapped to file names by replacing every character outside
/// `[A-Za-z0-9._-]` with `_`. Writes go to a temporary sibling first and are
/// renamed into place.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Store rows under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the rows.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the row for `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl StateBackend for FileBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, JourneyError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(JourneyError::storage(e)),
        }
    }

    async fn store(&self, key: &str, value: &str) -> Result<(), JourneyError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(JourneyError::storage)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(JourneyError::storage)?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(JourneyError::storage(e));
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(key, path = %path.display(), bytes = value.len(), "row written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), JourneyError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(JourneyError::storage(e)),
        }
    }
}
