use engine_core::metrics::ImportMetrics;
use engine_processing::producer::ReaderProgress;
use std::{path::PathBuf, time::Duration};

/// Which way the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPath {
    /// Reader exhausted its range and the writer committed everything.
    Completed,
    /// The external interrupt closed the gate before both stages finished.
    Interrupted,
}

#[derive(Debug)]
pub struct ImportSummary {
    pub path: RunPath,
    pub reader: ReaderProgress,
    /// Highest committed header number
    pub head: u64,
    pub metrics: ImportMetrics,
    /// Timing report location; only written on the completed path.
    pub report: Option<PathBuf>,
    pub elapsed: Duration,
}

impl ImportSummary {
    pub fn is_interrupted(&self) -> bool {
        self.path == RunPath::Interrupted
    }
}
