use crate::error::ReportError;
use async_trait::async_trait;
use engine_core::metrics::TimingSeries;
use std::path::PathBuf;

pub mod metrics;

/// Receives the writer's final timing series at the end of a completed run.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Publishes the series and returns where the artifact was written.
    async fn publish(&self, series: &TimingSeries) -> Result<PathBuf, ReportError>;
}
