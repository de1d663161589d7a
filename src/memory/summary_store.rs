//! Long-term summary persistence
//!
//! One record per session key. `load` never fails; a missing or unreadable
//! record reads as "no summary yet".

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::ChatError;
use crate::models::SessionKey;
use crate::Result;

/// Trait for summary persistence
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Current summary for `key`, or an empty string
    async fn load(&self, key: &SessionKey) -> String;

    /// Replace the summary for `key`
    async fn save(&self, key: &SessionKey, summary: &str) -> Result<()>;
}

/// Plain-text files at `<dir>/<key>.txt`
pub struct FileSummaryStore {
    dir: PathBuf,
}

impl FileSummaryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &SessionKey) -> PathBuf {
        self.dir.join(format!("{}.txt", key.as_str()))
    }
}

#[async_trait]
impl SummaryStore for FileSummaryStore {
    async fn load(&self, key: &SessionKey) -> String {
        let path = self.path_for(key);

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents.trim().to_string(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(session = %key, "No summary on disk yet");
                String::new()
            }
            Err(e) => {
                warn!(
                    "Summary at {} unreadable, treating as empty: {}",
                    path.display(),
                    e
                );
                String::new()
            }
        }
    }

    async fn save(&self, key: &SessionKey, summary: &str) -> Result<()> {
        let path = self.path_for(key);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ChatError::StorageWrite {
                path: self.dir.clone(),
                source,
            })?;

        tokio::fs::write(&path, summary)
            .await
            .map_err(|source| ChatError::StorageWrite {
                path: path.clone(),
                source,
            })?;

        info!(session = %key, bytes = summary.len(), "Summary written to {}", path.display());
        Ok(())
    }
}

/// In-memory summary store for development
pub struct InMemorySummaryStore {
    summaries: Arc<RwLock<HashMap<SessionKey, String>>>,
}

impl InMemorySummaryStore {
    pub fn new() -> Self {
        Self {
            summaries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySummaryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryStore for InMemorySummaryStore {
    async fn load(&self, key: &SessionKey) -> String {
        let summaries = self.summaries.read().await;
        summaries.get(key).cloned().unwrap_or_default()
    }

    async fn save(&self, key: &SessionKey, summary: &str) -> Result<()> {
        let mut summaries = self.summaries.write().await;
        summaries.insert(key.clone(), summary.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(raw: &str) -> SessionKey {
        SessionKey::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileSummaryStore::new(tmp.path());

        assert_eq!(store.load(&key("nobody")).await, "");
    }

    #[tokio::test]
    async fn test_load_existing_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        std::fs::write(dir.join("bob.txt"), "Bob likes cats.").unwrap();

        let store = FileSummaryStore::new(dir);
        assert_eq!(store.load(&key("bob")).await, "Bob likes cats.");
    }

    #[tokio::test]
    async fn test_load_unreadable_is_empty() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        // A directory where the file should be cannot be read as text
        std::fs::create_dir_all(dir.join("carol.txt")).unwrap();

        let store = FileSummaryStore::new(dir);
        assert_eq!(store.load(&key("carol")).await, "");
    }

    #[tokio::test]
    async fn test_save_creates_dir_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("summaries");
        let store = FileSummaryStore::new(&dir);
        let alice = key("alice");

        tokio_test::assert_ok!(store.save(&alice, "First summary").await);
        tokio_test::assert_ok!(store.save(&alice, "Second summary").await);

        let on_disk = std::fs::read_to_string(dir.join("alice.txt")).unwrap();
        assert_eq!(on_disk, "Second summary");
        assert_eq!(store.load(&alice).await, "Second summary");
    }

    #[tokio::test]
    async fn test_save_failure_is_storage_write() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        std::fs::create_dir_all(dir.join("dave.txt")).unwrap();

        let store = FileSummaryStore::new(dir);
        let err = store.save(&key("dave"), "summary").await.unwrap_err();
        assert!(matches!(err, ChatError::StorageWrite { .. }));
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemorySummaryStore::new();
        let erin = key("erin");

        assert_eq!(store.load(&erin).await, "");
        store.save(&erin, "Erin plays chess.").await.unwrap();
        assert_eq!(store.load(&erin).await, "Erin plays chess.");
    }
}
