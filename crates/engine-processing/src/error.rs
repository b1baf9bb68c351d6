use engine_core::error::{ArchiveError, ChainError};
use model::records::codec::CodecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("Failed to validate batch of {size} headers starting at {first}: {source}")]
    Validation {
        first: u64,
        size: usize,
        #[source]
        source: ChainError,
    },

    #[error("Failed to write batch of {size} headers starting at {first}: {source}")]
    Write {
        first: u64,
        size: usize,
        #[source]
        source: ChainError,
    },

    #[error("Chain store error: {0}")]
    Chain(#[from] ChainError),
}

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Failed to retrieve item {index}: {source}")]
    Retrieve {
        index: u64,
        #[source]
        source: ArchiveError,
    },

    #[error("Failed to decode item {index}: {source}")]
    Decode {
        index: u64,
        #[source]
        source: CodecError,
    },

    #[error("Failed to send batch: {0}")]
    ChannelSend(String),
}
