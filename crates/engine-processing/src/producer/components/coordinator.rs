use crate::error::ProducerError;
use model::records::batch::HeaderBatch;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of trying to hand a batch to the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Cancelled,
}

/// Delivers batches to the writer channel, racing each send against
/// cancellation.
pub struct BatchCoordinator {
    batch_tx: Option<mpsc::Sender<HeaderBatch>>,
    cancel: CancellationToken,
    headers_sent: u64,
    batches_sent: u64,
}

impl BatchCoordinator {
    pub fn new(batch_tx: mpsc::Sender<HeaderBatch>, cancel: CancellationToken) -> Self {
        Self {
            batch_tx: Some(batch_tx),
            cancel,
            headers_sent: 0,
            batches_sent: 0,
        }
    }

    /// Sends `batch` unless the gate closes first. A closed gate always wins
    /// over a send that could complete at the same time.
    pub async fn send_batch(&mut self, batch: HeaderBatch) -> Result<Delivery, ProducerError> {
        let tx = self
            .batch_tx
            .as_ref()
            .ok_or_else(|| ProducerError::ChannelSend("Channel already closed".to_string()))?;

        let (first, len) = (batch.first, batch.len());

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(first, len, "Delivery abandoned on cancellation");
                Ok(Delivery::Cancelled)
            }
            sent = tx.send(batch) => {
                sent.map_err(|e| ProducerError::ChannelSend(e.to_string()))?;
                self.headers_sent += len as u64;
                self.batches_sent += 1;
                Ok(Delivery::Sent)
            }
        }
    }

    /// Close the batch channel to signal the writer that the range is exhausted.
    pub fn close_channel(&mut self) {
        self.batch_tx = None;
    }

    pub fn headers_sent(&self) -> u64 {
        self.headers_sent
    }

    pub fn batches_sent(&self) -> u64 {
        self.batches_sent
    }
}
