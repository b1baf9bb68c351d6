use crate::error::ConsumerError;
use async_trait::async_trait;
use engine_core::metrics::ImportMetrics;

pub mod components;
pub mod headers;

#[derive(Debug)]
pub enum WriterOutcome {
    /// The channel closed with the gate open; every received batch is committed.
    Completed(ImportMetrics),
    /// The gate closed; whatever was committed before it stays committed.
    Cancelled(ImportMetrics),
}

impl WriterOutcome {
    pub fn metrics(&self) -> &ImportMetrics {
        match self {
            WriterOutcome::Completed(m) | WriterOutcome::Cancelled(m) => m,
        }
    }

    pub fn into_metrics(self) -> ImportMetrics {
        match self {
            WriterOutcome::Completed(m) | WriterOutcome::Cancelled(m) => m,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, WriterOutcome::Completed(_))
    }
}

#[async_trait]
pub trait DataConsumer: Send {
    /// Executes the consumer's main loop.
    async fn run(&mut self) -> Result<WriterOutcome, ConsumerError>;
}
