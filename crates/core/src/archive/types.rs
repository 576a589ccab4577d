use serde::Serialize;

/// Reference to the archived copy of a run's video.
///
/// Informational output of the run: publishing does not depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReference {
    /// Object name within the bucket.
    pub object_name: String,
    /// Public URL of the uploaded object.
    pub url: String,
}
