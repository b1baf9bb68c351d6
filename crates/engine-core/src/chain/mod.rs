use crate::error::ChainError;
use async_trait::async_trait;
use model::records::{batch::HeaderBatch, header::Header};

pub mod rules;
pub mod sled_store;

/// Persistent canonical header chain.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// Seeds an empty store with `genesis`; a no-op when the same genesis is
    /// already present.
    async fn init_genesis(&self, genesis: &Header) -> Result<(), ChainError>;

    /// Highest committed header, `None` before genesis.
    async fn head(&self) -> Result<Option<Header>, ChainError>;

    async fn header_by_number(&self, number: u64) -> Result<Option<Header>, ChainError>;

    /// Checks every header of the batch against its parent without writing.
    async fn validate_batch(&self, batch: &HeaderBatch) -> Result<(), ChainError>;

    /// Commits the whole batch atomically and returns the new head number.
    async fn insert_batch(&self, batch: &HeaderBatch) -> Result<u64, ChainError>;

    async fn flush(&self) -> Result<(), ChainError>;
}
