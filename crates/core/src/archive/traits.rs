//! Trait definition for the archive store seam.

use async_trait::async_trait;
use std::path::Path;

use super::error::ArchiveError;
use super::types::ArchiveReference;

/// A durable object store holding the archived copy of each run's video.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Uploads the local file under `object_name`, overwriting any object
    /// from a previous run, and returns a reference to it.
    async fn upload(
        &self,
        local_path: &Path,
        object_name: &str,
    ) -> Result<ArchiveReference, ArchiveError>;

    /// Validates that the store is reachable and properly configured.
    async fn validate(&self) -> Result<(), ArchiveError>;
}
