//! Mock asset store for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assets::{AssetFetchError, AssetStore, FetchedAsset};

/// Mock implementation of the [`AssetStore`] trait.
///
/// Writes placeholder files into the destination directory so the
/// file-existence contract between stages holds, records every fetch for
/// assertions, and fails on demand via an injectable error.
#[derive(Clone, Default)]
pub struct MockAssetStore {
    /// Recorded name sets, one entry per fetch call.
    fetches: Arc<RwLock<Vec<Vec<String>>>>,
    /// If set, the next fetch fails with this error.
    next_error: Arc<RwLock<Option<AssetFetchError>>>,
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: AssetFetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get the recorded fetch calls.
    pub async fn recorded_fetches(&self) -> Vec<Vec<String>> {
        self.fetches.read().await.clone()
    }

    /// Number of fetch calls performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    async fn take_error(&self) -> Option<AssetFetchError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(
        &self,
        names: &[String],
        dest_dir: &Path,
    ) -> Result<Vec<FetchedAsset>, AssetFetchError> {
        self.fetches.write().await.push(names.to_vec());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        tokio::fs::create_dir_all(dest_dir).await?;

        let mut fetched = Vec::with_capacity(names.len());
        for name in names {
            let path = dest_dir.join(name);
            let content = format!("mock asset: {name}");
            tokio::fs::write(&path, &content).await?;
            fetched.push(FetchedAsset {
                name: name.clone(),
                path,
                size_bytes: content.len() as u64,
            });
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_writes_files_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = MockAssetStore::new();

        let names = vec!["107.mp3".to_string(), "bg.png".to_string()];
        let fetched = store.fetch(&names, dir.path()).await.unwrap();

        assert_eq!(fetched.len(), 2);
        assert!(dir.path().join("107.mp3").exists());
        assert_eq!(store.fetch_count().await, 1);
        assert_eq!(store.recorded_fetches().await[0], names);
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let dir = tempfile::tempdir().unwrap();
        let store = MockAssetStore::new();
        store.set_next_error(AssetFetchError::Timeout).await;

        let names = vec!["bg.png".to_string()];
        assert!(store.fetch(&names, dir.path()).await.is_err());
        assert!(store.fetch(&names, dir.path()).await.is_ok());
    }
}
