use crate::{
    consumer::{DataConsumer, WriterOutcome, components::writer::BatchWriter},
    error::ConsumerError,
};
use async_trait::async_trait;
use engine_core::{chain::ChainStore, metrics::ImportMetrics};
use model::records::batch::HeaderBatch;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Writer stage: commits batches strictly one at a time in arrival order and
/// accumulates validation and write timings.
pub struct HeaderWriter {
    batch_rx: mpsc::Receiver<HeaderBatch>,
    writer: BatchWriter,
    cancel: CancellationToken,
}

impl HeaderWriter {
    pub fn new(
        batch_rx: mpsc::Receiver<HeaderBatch>,
        store: Arc<dyn ChainStore>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            batch_rx,
            writer: BatchWriter::new(store),
            cancel,
        }
    }

    /// Waits for the next batch. `None` means stop: either the gate closed
    /// or the channel did.
    async fn next_batch(&mut self) -> Option<HeaderBatch> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            batch = self.batch_rx.recv() => batch,
        }
    }
}

#[async_trait]
impl DataConsumer for HeaderWriter {
    async fn run(&mut self) -> Result<WriterOutcome, ConsumerError> {
        info!("Writer started");
        let mut metrics = ImportMetrics::new();

        while let Some(batch) = self.next_batch().await {
            let count = batch.len();
            let result = self.writer.commit(&batch).await?;
            let sample = metrics.record_batch(count as u64, result.validation, result.write);

            info!(
                count,
                head = result.head,
                vtime = ?result.validation,
                wtime = ?result.write,
                all = sample.headers_committed,
                tot_v = ?metrics.total_validation(),
                tot_w = ?metrics.total_write(),
                "Wrote headers"
            );
        }

        // A reader that stopped on cancellation or failure also drops its
        // sender, so a closed channel alone does not mean the range is done.
        if self.cancel.is_cancelled() {
            info!(
                headers = metrics.headers_committed(),
                batches = metrics.batches(),
                "Writer cancelled"
            );
            return Ok(WriterOutcome::Cancelled(metrics));
        }

        self.writer.flush().await?;
        info!(
            headers = metrics.headers_committed(),
            batches = metrics.batches(),
            "Writer finished"
        );
        Ok(WriterOutcome::Completed(metrics))
    }
}
