//! Trait definition for the asset store seam.

use async_trait::async_trait;
use std::path::Path;

use super::error::AssetFetchError;
use super::types::FetchedAsset;

/// A remote store holding the run's media assets.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Downloads exactly the named files into `dest_dir`, overwriting stale
    /// copies from a previous run. Fails if any requested file is missing
    /// remotely; partial results are not returned.
    async fn fetch(
        &self,
        names: &[String],
        dest_dir: &Path,
    ) -> Result<Vec<FetchedAsset>, AssetFetchError>;
}
