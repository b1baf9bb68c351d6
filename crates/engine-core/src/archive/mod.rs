use crate::error::ArchiveError;
use async_trait::async_trait;

pub mod freezer;

/// Default table holding encoded headers.
pub const HEADERS_TABLE: &str = "headers";

/// Read-only access to an index-keyed archive of immutable records.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns the raw payload stored at `index`.
    async fn retrieve(&self, index: u64) -> Result<Vec<u8>, ArchiveError>;
}
