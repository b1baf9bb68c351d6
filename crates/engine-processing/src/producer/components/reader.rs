use crate::error::ProducerError;
use engine_core::archive::Retriever;
use model::records::{codec::HeaderDecoder, header::Header};
use std::sync::Arc;
use tracing::error;

/// Pulls one archive record and decodes it into a header.
pub struct ArchiveReader {
    retriever: Arc<dyn Retriever>,
    decoder: Arc<dyn HeaderDecoder>,
}

impl ArchiveReader {
    pub fn new(retriever: Arc<dyn Retriever>, decoder: Arc<dyn HeaderDecoder>) -> Self {
        Self { retriever, decoder }
    }

    pub async fn read(&self, index: u64) -> Result<Header, ProducerError> {
        let bytes = self.retriever.retrieve(index).await.map_err(|source| {
            error!(index, error = %source, "Read error");
            ProducerError::Retrieve { index, source }
        })?;

        self.decoder.decode(&bytes).map_err(|source| {
            error!(index, error = %source, "Decode error");
            ProducerError::Decode { index, source }
        })
    }
}
