use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::models::{Event, User};

const EVENTS_FILE: &str = "events.json";
const USERS_FILE: &str = "users.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// JSON-file-backed document store.
///
/// Each collection is a single file holding the full record list; every
/// save replaces the whole file. Reads tolerate a missing or corrupt file
/// by returning an empty list — the next write overwrites whatever was
/// there, so corruption is discarded rather than escalated.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub async fn load_events(&self) -> Vec<Event> {
        load_list(&self.data_dir.join(EVENTS_FILE)).await
    }

    pub async fn save_events(&self, events: &[Event]) -> Result<(), StoreError> {
        self.save_list(EVENTS_FILE, events).await
    }

    pub async fn load_users(&self) -> Vec<User> {
        load_list(&self.data_dir.join(USERS_FILE)).await
    }

    pub async fn save_users(&self, users: &[User]) -> Result<(), StoreError> {
        self.save_list(USERS_FILE, users).await
    }

    async fn save_list<T: Serialize>(&self, file: &str, records: &[T]) -> Result<(), StoreError> {
        let path = self.data_dir.join(file);
        if let Err(e) = tokio::fs::create_dir_all(&self.data_dir).await {
            return Err(StoreError::Write {
                path: self.data_dir.clone(),
                source: e,
            });
        }
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| StoreError::Write { path, source })
    }
}

async fn load_list<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            // Corrupt file degrades to an empty collection; the next save
            // overwrites it
            warn!("discarding corrupt store file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Next monotonically increasing event id (1 for an empty store).
pub fn next_event_id(events: &[Event]) -> u64 {
    events.iter().map(|e| e.id).max().unwrap_or(0) + 1
}

/// Next monotonically increasing user id (1 for an empty store).
pub fn next_user_id(users: &[User]) -> u64 {
    users.iter().map(|u| u.id).max().unwrap_or(0) + 1
}
