use crate::error::ProducerError;
use async_trait::async_trait;

pub mod components;
pub mod config;
pub mod headers;

/// How far the reader got before returning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderProgress {
    pub headers_sent: u64,
    pub batches_sent: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderOutcome {
    /// The whole range was delivered and the channel closed.
    Completed(ReaderProgress),
    /// The cancellation gate closed before a delivery; the channel was left open.
    Cancelled(ReaderProgress),
}

impl ReaderOutcome {
    pub fn progress(&self) -> ReaderProgress {
        match self {
            ReaderOutcome::Completed(p) | ReaderOutcome::Cancelled(p) => *p,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ReaderOutcome::Completed(_))
    }
}

#[async_trait]
pub trait DataProducer: Send {
    /// Executes the producer's main loop.
    async fn run(&mut self) -> Result<ReaderOutcome, ProducerError>;
}
