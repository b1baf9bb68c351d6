use engine_config::error::SettingsError;
use engine_runtime::error::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to run the header import: {0}")]
    Runner(#[from] ImportError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

impl CliError {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, CliError::Runner(ImportError::ShutdownRequested))
    }
}
