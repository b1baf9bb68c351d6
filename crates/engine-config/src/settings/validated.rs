use crate::error::SettingsError;
use model::core::range::IndexRange;
use std::{num::NonZeroUsize, path::PathBuf};

pub const DEFAULT_FROM: u64 = 1;
pub const DEFAULT_CHUNK_SIZE: usize = 2048;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;
pub const DEFAULT_SEAL_CHECK_INTERVAL: usize = 100;
pub const DEFAULT_TABLE: &str = "headers";
pub const DEFAULT_REPORT_NAME: &str = "times";

/// Immutable, validated configuration for one import run.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    /// First archive index to import; index 0 holds the genesis record.
    pub from: u64,
    /// Number of headers to import.
    pub count: u64,
    /// Headers per batch handed from reader to writer
    pub chunk_size: NonZeroUsize,
    /// Batches buffered between reader and writer
    pub channel_capacity: NonZeroUsize,
    /// Worker threads validating one batch
    pub validation_concurrency: NonZeroUsize,
    /// Verify the proof of work on every n-th header of a batch
    pub seal_check_interval: NonZeroUsize,
    /// Archive table holding encoded headers
    pub table: String,
    pub report_dir: PathBuf,
    pub report_name: String,
}

impl ImportSettings {
    pub fn range(&self) -> IndexRange {
        IndexRange::starting_at(self.from, self.count)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.get()
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity.get()
    }

    pub fn validation_concurrency(&self) -> NonZeroUsize {
        self.validation_concurrency
    }

    pub fn seal_check_interval(&self) -> NonZeroUsize {
        self.seal_check_interval
    }
}

fn positive(
    value: Option<usize>,
    default: usize,
    name: &'static str,
) -> Result<NonZeroUsize, SettingsError> {
    NonZeroUsize::new(value.unwrap_or(default)).ok_or(SettingsError::Zero(name))
}

#[derive(Debug, Default, Clone)]
pub struct ImportSettingsBuilder {
    pub from: Option<u64>,
    pub count: u64,
    pub chunk_size: Option<usize>,
    pub channel_capacity: Option<usize>,
    pub validation_concurrency: Option<usize>,
    pub seal_check_interval: Option<usize>,
    pub table: Option<String>,
    pub report_dir: Option<PathBuf>,
    pub report_name: Option<String>,
}

impl ImportSettingsBuilder {
    pub fn new(count: u64) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    pub fn from_index(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    pub fn validation_concurrency(mut self, concurrency: usize) -> Self {
        self.validation_concurrency = Some(concurrency);
        self
    }

    pub fn seal_check_interval(mut self, interval: usize) -> Self {
        self.seal_check_interval = Some(interval);
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(dir.into());
        self
    }

    pub fn report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<ImportSettings, SettingsError> {
        let default_concurrency = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        Ok(ImportSettings {
            from: self.from.unwrap_or(DEFAULT_FROM),
            count: self.count,
            chunk_size: positive(self.chunk_size, DEFAULT_CHUNK_SIZE, "chunk size")?,
            channel_capacity: positive(
                self.channel_capacity,
                DEFAULT_CHANNEL_CAPACITY,
                "channel capacity",
            )?,
            validation_concurrency: positive(
                self.validation_concurrency,
                default_concurrency,
                "validation concurrency",
            )?,
            seal_check_interval: positive(
                self.seal_check_interval,
                DEFAULT_SEAL_CHECK_INTERVAL,
                "seal check interval",
            )?,
            table: self.table.unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            report_dir: self.report_dir.unwrap_or_else(|| PathBuf::from(".")),
            report_name: self
                .report_name
                .unwrap_or_else(|| DEFAULT_REPORT_NAME.to_string()),
        })
    }
}
