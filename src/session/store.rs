//! Session persistence backends
//!
//! The persistence seam is a key-value trait with two implementations: a
//! JSON file on disk for real use (the analogue of the original client's
//! device storage) and an in-memory map for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::SessionError;

/// Key-value persistence seam for the session entries
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    async fn remove(&self, key: &str) -> Result<(), SessionError>;
    async fn clear(&self) -> Result<(), SessionError>;
}

/// Session entries persisted as one small JSON document on disk
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_entries(&self) -> Result<HashMap<String, String>, SessionError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|_| SessionError::Corrupt {
                path: self.path.clone(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(SessionError::Io {
                path: self.path.clone(),
                error: e.to_string(),
            }),
        }
    }

    async fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::Io {
                    path: self.path.clone(),
                    error: e.to_string(),
                })?;
        }

        let content = serde_json::to_string_pretty(entries).map_err(|e| SessionError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| SessionError::Io {
                path: self.path.clone(),
                error: e.to_string(),
            })
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        // A corrupt file is replaced rather than propagated: writers always
        // leave valid JSON behind.
        let mut entries = self.read_entries().await.unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.read_entries().await.unwrap_or_default();
        entries.remove(key);
        self.write_entries(&entries).await
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io {
                path: self.path.clone(),
                error: e.to_string(),
            }),
        }
    }
}

/// In-memory session store for tests
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}
