use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize timing report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write timing report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
