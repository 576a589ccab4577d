//! Durable archiving of the composed video to an object store.

mod error;
mod s3;
mod traits;
mod types;

pub use error::ArchiveError;
pub use s3::S3Archive;
pub use traits::ArchiveStore;
pub use types::ArchiveReference;
