use engine_config::error::ReportError;
use engine_core::error::{ArchiveError, ChainError};
use engine_processing::error::{ConsumerError, ProducerError};
use thiserror::Error;

/// Top-level errors for a header import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The scratch directory could not be created.
    #[error("Failed to provision scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Chain store error: {0}")]
    Chain(#[from] ChainError),

    #[error("Reader failed: {0}")]
    Reader(#[from] ProducerError),

    #[error("Writer failed: {0}")]
    Writer(#[from] ConsumerError),

    #[error("Failed to publish timing report: {0}")]
    Report(#[from] ReportError),

    /// An error occurred while joining a task.
    /// This usually indicates that the task was cancelled or panicked.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Shutdown requested")]
    ShutdownRequested,
}
