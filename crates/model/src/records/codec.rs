use crate::records::header::{Header, MAX_EXTRA_DATA};
use bincode::Options;
use thiserror::Error;

/// Generous bound on one encoded header; rejects corrupt length prefixes
/// before they turn into large allocations.
const MAX_ENCODED_LEN: u64 = 256 + MAX_EXTRA_DATA as u64 * 4;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to encode header {number}: {source}")]
    Encode {
        number: u64,
        #[source]
        source: bincode::Error,
    },

    #[error("Failed to decode header from {len} bytes: {source}")]
    Decode {
        len: usize,
        #[source]
        source: bincode::Error,
    },
}

/// Turns raw archive payloads into headers.
pub trait HeaderDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Header, CodecError>;
}

/// Fixed-width bincode encoding, rejecting trailing bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeHeaderCodec;

impl BincodeHeaderCodec {
    fn options() -> impl Options {
        bincode::options()
            .with_fixint_encoding()
            .with_limit(MAX_ENCODED_LEN)
            .reject_trailing_bytes()
    }

    pub fn encode(&self, header: &Header) -> Result<Vec<u8>, CodecError> {
        Self::options()
            .serialize(header)
            .map_err(|source| CodecError::Encode {
                number: header.number,
                source,
            })
    }
}

impl HeaderDecoder for BincodeHeaderCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Header, CodecError> {
        Self::options()
            .deserialize(bytes)
            .map_err(|source| CodecError::Decode {
                len: bytes.len(),
                source,
            })
    }
}
