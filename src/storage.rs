//! Durable string key-value storage.
//!
//! Everything the tracker remembers between runs goes through [`Store`]. The
//! on-disk flavour keeps the whole key space in a single JSON object and
//! rewrites it on every write.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::Mutex,
};

#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

pub mod keys {
    /// Today's running total, decimal integer
    pub const WATER_AMOUNT: &str = "waterAmount";
    /// Active goal, decimal integer
    pub const GOAL: &str = "goal";
    /// JSON array of history entries, newest first
    pub const HISTORY: &str = "history";
    /// Day of the last reconciliation
    pub const LAST_UPDATE: &str = "lastUpdate";
    /// `"true"` / `"false"`
    pub const REMINDERS_ENABLED: &str = "remindersEnabled";
}

pub const STORE_FILE_NAME: &str = "store.json";

#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Writes every entry as one unit.
    async fn set_many(&self, entries: &[(&str, String)]) -> AppResult<()>;

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        self.set_many(&[(key, value)]).await
    }
}

pub fn project_dirs() -> AppResult<ProjectDirs> {
    ProjectDirs::from("fyi", "angelo", "hydrate-tracker")
        .ok_or_else(|| AppError::Config("Unable to resolve a home directory".into()))
}

pub fn default_data_dir() -> AppResult<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// JSON object file, cached in memory after the first read
pub struct FileStore {
    path: PathBuf,
    entries: tokio::sync::Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub async fn open(data_dir: &Path) -> AppResult<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let path = data_dir.join(STORE_FILE_NAME);
        debug!(path = %path.display(), "Opening store");

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(entries) => entries,
                Err(error) => {
                    let corrupt = path.with_extension("json.corrupt");
                    warn!(%error, moved_to = %corrupt.display(), "Store file is corrupted, starting empty");
                    tokio::fs::rename(&path, &corrupt).await?;
                    BTreeMap::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => return Err(error.into()),
        };

        Ok(Self {
            path,
            entries: tokio::sync::Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        let serialized = serde_json::to_vec_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");

        tokio::fs::write(&staging, serialized).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_many(&self, updates: &[(&str, String)]) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        let mut staged = entries.clone();
        for (key, value) in updates {
            staged.insert((*key).to_string(), value.clone());
        }

        // The cache only ever holds what made it to disk
        self.flush(&staged).await?;
        *entries = staged;
        Ok(())
    }
}

/// Volatile store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    #[cfg(test)]
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::default();
        {
            let mut map = store.entries.lock().unwrap_or_else(|e| e.into_inner());
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        }
        store
    }

    #[cfg(test)]
    pub(crate) fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn refuses_writes(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }

    #[cfg(not(test))]
    fn refuses_writes(&self) -> bool {
        false
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    async fn set_many(&self, updates: &[(&str, String)]) -> AppResult<()> {
        if self.refuses_writes() {
            return Err(AppError::Storage("writes are disabled".into()));
        }

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in updates {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}
