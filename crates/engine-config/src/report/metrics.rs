use crate::{error::ReportError, report::ReportSink};
use async_trait::async_trait;
use engine_core::metrics::TimingSeries;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct TimingReport<'a> {
    batches: usize,
    headers_committed: u64,
    total_validation_ms: u64,
    total_write_ms: u64,
    series: &'a TimingSeries,
}

impl<'a> TimingReport<'a> {
    pub fn new(series: &'a TimingSeries) -> Self {
        TimingReport {
            batches: series.len(),
            headers_committed: series.headers.last().copied().unwrap_or(0),
            total_validation_ms: series.validation_ms.last().copied().unwrap_or(0),
            total_write_ms: series.write_ms.last().copied().unwrap_or(0),
            series,
        }
    }
}

/// Writes the timing series as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    dir: PathBuf,
    name: String,
}

impl JsonReportWriter {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name))
    }
}

#[async_trait]
impl ReportSink for JsonReportWriter {
    async fn publish(&self, series: &TimingSeries) -> Result<PathBuf, ReportError> {
        let path = self.path();
        let json = serde_json::to_vec_pretty(&TimingReport::new(series))?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;

        info!(file = %path.display(), points = series.len(), "Rendered timing report");
        Ok(path)
    }
}
