use crate::error::ConsumerError;
use engine_core::chain::ChainStore;
use model::records::batch::HeaderBatch;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::error;

#[derive(Debug, Clone, Copy)]
pub struct CommitResult {
    /// Head number after the commit
    pub head: u64,
    pub validation: Duration,
    pub write: Duration,
}

/// Validates then commits one batch against the chain store.
pub struct BatchWriter {
    store: Arc<dyn ChainStore>,
}

impl BatchWriter {
    pub fn new(store: Arc<dyn ChainStore>) -> Self {
        Self { store }
    }

    /// Runs validation to completion before the insert starts. Nothing of
    /// the batch is written when validation fails.
    pub async fn commit(&self, batch: &HeaderBatch) -> Result<CommitResult, ConsumerError> {
        let first = batch.first;
        let size = batch.len();

        let t0 = Instant::now();
        self.store.validate_batch(batch).await.map_err(|source| {
            error!(first, size, error = %source, "Header validation failed");
            ConsumerError::Validation {
                first,
                size,
                source,
            }
        })?;

        let t1 = Instant::now();
        let head = self.store.insert_batch(batch).await.map_err(|source| {
            error!(first, size, error = %source, "Header insertion failed");
            ConsumerError::Write {
                first,
                size,
                source,
            }
        })?;
        let t2 = Instant::now();

        Ok(CommitResult {
            head,
            validation: t1 - t0,
            write: t2 - t1,
        })
    }

    pub async fn flush(&self) -> Result<(), ConsumerError> {
        self.store.flush().await.map_err(ConsumerError::from)
    }
}
