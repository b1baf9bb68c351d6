use model::core::range::IndexRange;
use std::num::NonZeroUsize;

/// Configuration for the reader stage.
#[derive(Debug, Clone, Copy)]
pub struct ProducerConfig {
    /// Archive positions to read
    pub range: IndexRange,

    /// Number of headers per delivered batch
    pub chunk_size: NonZeroUsize,
}

impl ProducerConfig {
    pub fn new(range: IndexRange, chunk_size: NonZeroUsize) -> Self {
        Self { range, chunk_size }
    }
}
