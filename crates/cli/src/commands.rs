use crate::{env::EnvManager, error::CliError};
use clap::Parser;
use engine_config::settings::{ImportSettings, ImportSettingsBuilder};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "headerimport",
    version = "0.1.0",
    about = "Import archived block headers into a fresh chain database and time it"
)]
pub struct Cli {
    /// Directory holding the archive tables
    pub archive_dir: PathBuf,

    /// Number of headers to import
    pub count: u64,

    /// First archive index to import
    #[arg(long)]
    pub from: Option<u64>,

    /// Headers per batch
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Batches buffered between reader and writer
    #[arg(long)]
    pub channel_capacity: Option<usize>,

    /// Threads validating one batch
    #[arg(long)]
    pub validation_concurrency: Option<usize>,

    /// Verify the proof of work on every n-th header
    #[arg(long)]
    pub seal_check_interval: Option<usize>,

    /// Archive table name
    #[arg(long)]
    pub table: Option<String>,

    /// Directory for the timing report
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Timing report file name, without extension
    #[arg(long)]
    pub report_name: Option<String>,

    /// Parent directory for the scratch chain database
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Extra .env file read on top of the process environment
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Defaults, then environment, then explicit flags.
    pub fn settings(&self, env: &EnvManager) -> Result<ImportSettings, CliError> {
        let mut builder = ImportSettingsBuilder::new(self.count).apply_env(&env.import_vars())?;

        if let Some(from) = self.from {
            builder = builder.from_index(from);
        }
        if let Some(v) = self.chunk_size {
            builder = builder.chunk_size(v);
        }
        if let Some(v) = self.channel_capacity {
            builder = builder.channel_capacity(v);
        }
        if let Some(v) = self.validation_concurrency {
            builder = builder.validation_concurrency(v);
        }
        if let Some(v) = self.seal_check_interval {
            builder = builder.seal_check_interval(v);
        }
        if let Some(table) = &self.table {
            builder = builder.table(table.clone());
        }
        if let Some(dir) = &self.report_dir {
            builder = builder.report_dir(dir.clone());
        }
        if let Some(name) = &self.report_name {
            builder = builder.report_name(name.clone());
        }

        Ok(builder.build()?)
    }
}
