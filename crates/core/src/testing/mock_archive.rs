//! Mock archive store for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::archive::{ArchiveError, ArchiveReference, ArchiveStore};

/// Mock implementation of the [`ArchiveStore`] trait.
#[derive(Clone, Default)]
pub struct MockArchive {
    /// Recorded (local path, object name) upload calls.
    uploads: Arc<RwLock<Vec<(PathBuf, String)>>>,
    /// If set, the next upload fails with this error.
    next_error: Arc<RwLock<Option<ArchiveError>>>,
}

impl MockArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next upload to fail with the given error.
    pub async fn set_next_error(&self, error: ArchiveError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get the recorded upload calls.
    pub async fn recorded_uploads(&self) -> Vec<(PathBuf, String)> {
        self.uploads.read().await.clone()
    }

    /// Number of upload calls performed.
    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }
}

#[async_trait]
impl ArchiveStore for MockArchive {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(
        &self,
        local_path: &Path,
        object_name: &str,
    ) -> Result<ArchiveReference, ArchiveError> {
        self.uploads
            .write()
            .await
            .push((local_path.to_path_buf(), object_name.to_string()));

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(ArchiveReference {
            object_name: object_name.to_string(),
            url: format!("https://archive.test/{object_name}"),
        })
    }

    async fn validate(&self) -> Result<(), ArchiveError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_records_and_returns_reference() {
        let archive = MockArchive::new();
        let reference = archive
            .upload(Path::new("output_video.mp4"), "output_video_tn.mp4")
            .await
            .unwrap();

        assert_eq!(reference.url, "https://archive.test/output_video_tn.mp4");
        assert_eq!(archive.upload_count().await, 1);
    }
}
