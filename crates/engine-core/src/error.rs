use model::core::hash::BlockHash;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to open archive file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read item {index} from table '{table}': {source}")]
    Read {
        table: String,
        index: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to table '{table}': {source}")]
    Write {
        table: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Item {index} is out of bounds for table '{table}' ({items} items)")]
    OutOfBounds { table: String, index: u64, items: u64 },

    #[error("Corrupt index for table '{table}': {reason}")]
    CorruptIndex { table: String, reason: String },
}

/// Why a header was rejected by the chain rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("expected number {expected}, got {actual}")]
    NumberGap { expected: u64, actual: u64 },

    #[error("parent hash {actual} does not match parent {expected}")]
    ParentMismatch { expected: BlockHash, actual: BlockHash },

    #[error("timestamp {timestamp} is not after parent timestamp {parent}")]
    TimestampNotIncreasing { parent: u64, timestamp: u64 },

    #[error("gas used {used} exceeds gas limit {limit}")]
    GasUsedExceedsLimit { used: u64, limit: u64 },

    #[error("gas limit {limit} drifts too far from parent limit {parent}")]
    GasLimitDrift { parent: u64, limit: u64 },

    #[error("extra data is {len} bytes, at most {max} allowed")]
    ExtraDataTooLong { len: usize, max: usize },

    #[error("difficulty must be positive")]
    ZeroDifficulty,

    #[error("invalid proof of work")]
    InvalidSeal,
}

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Chain storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Failed to encode or decode a stored header: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Stored genesis {stored} does not match expected genesis {expected}")]
    GenesisMismatch {
        stored: BlockHash,
        expected: BlockHash,
    },

    #[error("Chain has not been initialised with a genesis header")]
    MissingGenesis,

    #[error("Header {number} failed validation: {failure}")]
    Invalid {
        number: u64,
        failure: ValidationFailure,
    },

    #[error("Batch starting at {first} does not extend head {head}")]
    NotContiguous { head: u64, first: u64 },

    #[error("Validation worker pool failed: {0}")]
    WorkerPool(String),
}

