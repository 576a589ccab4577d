//! Mock collaborators for testing.
//!
//! Each mock mirrors one external seam with controllable behavior:
//! configurable results, injectable errors and recorded calls for
//! assertions.

mod mock_archive;
mod mock_asset_store;
mod mock_composer;
mod mock_llm;
mod mock_publisher;

pub use mock_archive::MockArchive;
pub use mock_asset_store::MockAssetStore;
pub use mock_composer::MockComposer;
pub use mock_llm::MockLlm;
pub use mock_publisher::MockPublisher;
