//! S3-backed archive store built on an OpenDAL operator.

use async_trait::async_trait;
use opendal::{services, Operator};
use std::path::Path;
use tracing::info;

use crate::config::StorageConfig;

use super::error::ArchiveError;
use super::traits::ArchiveStore;
use super::types::ArchiveReference;

/// S3 implementation of [`ArchiveStore`].
pub struct S3Archive {
    operator: Operator,
    config: StorageConfig,
}

impl S3Archive {
    /// Creates a new archive store from the storage configuration.
    pub fn new(config: StorageConfig) -> Result<Self, ArchiveError> {
        let mut builder = services::S3::default()
            .bucket(&config.bucket)
            .region(&config.region)
            .access_key_id(&config.access_key)
            .secret_access_key(&config.secret_key);

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        let operator = Operator::new(builder)
            .map_err(|e| ArchiveError::Init(e.to_string()))?
            .finish();

        Ok(Self { operator, config })
    }

    /// Public URL an uploaded object is reachable under.
    ///
    /// Prefers the configured public base URL (CDN or static site front)
    /// and falls back to the standard bucket URL form.
    fn public_url(&self, object_name: &str) -> String {
        match self.config.public_url {
            Some(ref base) => format!("{}/{}", base.trim_end_matches('/'), object_name),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.config.bucket, self.config.region, object_name
            ),
        }
    }
}

#[async_trait]
impl ArchiveStore for S3Archive {
    fn name(&self) -> &str {
        "s3"
    }

    async fn upload(
        &self,
        local_path: &Path,
        object_name: &str,
    ) -> Result<ArchiveReference, ArchiveError> {
        if !local_path.exists() {
            return Err(ArchiveError::InputNotFound {
                path: local_path.to_path_buf(),
            });
        }

        let bytes = tokio::fs::read(local_path).await?;
        let size_bytes = bytes.len() as u64;

        self.operator.write(object_name, bytes).await?;

        let reference = ArchiveReference {
            object_name: object_name.to_string(),
            url: self.public_url(object_name),
        };

        info!(
            object = %reference.object_name,
            url = %reference.url,
            size_bytes,
            "Video archived"
        );
        Ok(reference)
    }

    async fn validate(&self) -> Result<(), ArchiveError> {
        self.operator.check().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_config(public_url: Option<&str>) -> StorageConfig {
        StorageConfig {
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            region: "eu-west-1".to_string(),
            bucket: "quotes".to_string(),
            endpoint: None,
            public_url: public_url.map(String::from),
        }
    }

    #[test]
    fn test_public_url_from_configured_base() {
        let archive = S3Archive::new(storage_config(Some("https://cdn.example.com/"))).unwrap();
        assert_eq!(
            archive.public_url("output_video_tn.mp4"),
            "https://cdn.example.com/output_video_tn.mp4"
        );
    }

    #[test]
    fn test_public_url_falls_back_to_bucket_form() {
        let archive = S3Archive::new(storage_config(None)).unwrap();
        assert_eq!(
            archive.public_url("output_video_tn.mp4"),
            "https://quotes.s3.eu-west-1.amazonaws.com/output_video_tn.mp4"
        );
    }

    #[tokio::test]
    async fn test_upload_missing_input_fails() {
        let archive = S3Archive::new(storage_config(None)).unwrap();
        let err = archive
            .upload(Path::new("/nonexistent/video.mp4"), "video.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::InputNotFound { .. }));
    }
}
