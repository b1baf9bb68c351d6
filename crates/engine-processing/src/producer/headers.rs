use crate::{
    error::ProducerError,
    producer::{
        DataProducer, ReaderOutcome, ReaderProgress,
        components::{
            coordinator::{BatchCoordinator, Delivery},
            reader::ArchiveReader,
        },
        config::ProducerConfig,
    },
};
use async_trait::async_trait;
use engine_core::archive::Retriever;
use model::records::{batch::HeaderBatch, codec::HeaderDecoder, header::Header};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Upper bound on the capacity reserved for a pending batch. Larger chunks
/// grow on demand.
const MAX_PREALLOCATED_HEADERS: usize = 2048;

/// Reader stage: pulls `[from, to)` from the archive, decodes each record and
/// delivers fixed-size batches in index order.
///
/// A retrieval or decode failure returns the error with the channel still
/// open. Whoever drives the stage is expected to close the cancellation gate
/// before dropping it.
pub struct HeaderReader {
    config: ProducerConfig,
    reader: ArchiveReader,
    coordinator: BatchCoordinator,
}

impl HeaderReader {
    pub fn new(
        config: ProducerConfig,
        retriever: Arc<dyn Retriever>,
        decoder: Arc<dyn HeaderDecoder>,
        batch_tx: mpsc::Sender<HeaderBatch>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            reader: ArchiveReader::new(retriever, decoder),
            coordinator: BatchCoordinator::new(batch_tx, cancel),
        }
    }

    fn progress(&self) -> ReaderProgress {
        ReaderProgress {
            headers_sent: self.coordinator.headers_sent(),
            batches_sent: self.coordinator.batches_sent(),
        }
    }

    fn buffer(&self) -> Vec<Header> {
        let cap = self
            .config
            .range
            .len()
            .min(self.config.chunk_size.get() as u64)
            .min(MAX_PREALLOCATED_HEADERS as u64);
        Vec::with_capacity(cap as usize)
    }
}

#[async_trait]
impl DataProducer for HeaderReader {
    async fn run(&mut self) -> Result<ReaderOutcome, ProducerError> {
        let range = self.config.range;
        let chunk_size = self.config.chunk_size.get();
        let plan = range.chunk_plan(chunk_size as u64);

        info!(
            from = range.from,
            to = range.to,
            chunk_size,
            batches = plan.total_batches(),
            "Reader started"
        );

        let mut pending = self.buffer();
        let mut first = range.from;

        for index in range.iter() {
            if pending.is_empty() {
                first = index;
            }
            pending.push(self.reader.read(index).await?);

            let is_last = index + 1 == range.to;
            if pending.len() == chunk_size || is_last {
                let headers = std::mem::replace(&mut pending, self.buffer());
                let batch = HeaderBatch::new(first, headers);

                if self.coordinator.send_batch(batch).await? == Delivery::Cancelled {
                    let progress = self.progress();
                    info!(
                        headers_sent = progress.headers_sent,
                        batches_sent = progress.batches_sent,
                        "Reader cancelled"
                    );
                    return Ok(ReaderOutcome::Cancelled(progress));
                }
            }
        }

        self.coordinator.close_channel();

        let progress = self.progress();
        info!(
            headers_sent = progress.headers_sent,
            batches_sent = progress.batches_sent,
            "Reader finished"
        );
        Ok(ReaderOutcome::Completed(progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::error::ArchiveError;
    use model::{
        core::range::IndexRange,
        records::{codec::BincodeHeaderCodec, synthetic::SyntheticChain},
    };
    use std::{num::NonZeroUsize, time::Duration};
    use tokio::sync::mpsc::error::TryRecvError;

    /// In-memory archive holding genesis at 0 and synthetic headers after it.
    struct VecRetriever {
        items: Vec<Vec<u8>>,
        fail_at: Option<u64>,
    }

    impl VecRetriever {
        fn with_headers(count: usize) -> Self {
            let codec = BincodeHeaderCodec;
            let mut items = vec![codec.encode(&Header::genesis()).unwrap()];
            items.extend(
                SyntheticChain::from_genesis()
                    .generate(count)
                    .iter()
                    .map(|h| codec.encode(h).unwrap()),
            );
            Self {
                items,
                fail_at: None,
            }
        }

        fn failing_at(mut self, index: u64) -> Self {
            self.fail_at = Some(index);
            self
        }

        fn corrupt(mut self, index: usize) -> Self {
            self.items[index] = vec![0xff; 3];
            self
        }
    }

    #[async_trait]
    impl Retriever for VecRetriever {
        async fn retrieve(&self, index: u64) -> Result<Vec<u8>, ArchiveError> {
            let out_of_bounds = || ArchiveError::OutOfBounds {
                table: "headers".to_string(),
                index,
                items: self.items.len() as u64,
            };
            if self.fail_at == Some(index) {
                return Err(out_of_bounds());
            }
            self.items.get(index as usize).cloned().ok_or_else(out_of_bounds)
        }
    }

    fn reader(
        retriever: VecRetriever,
        range: IndexRange,
        chunk: usize,
        capacity: usize,
        cancel: CancellationToken,
    ) -> (HeaderReader, mpsc::Receiver<HeaderBatch>) {
        let (tx, rx) = mpsc::channel(capacity);
        let config = ProducerConfig::new(range, NonZeroUsize::new(chunk).unwrap());
        let reader = HeaderReader::new(
            config,
            Arc::new(retriever),
            Arc::new(BincodeHeaderCodec),
            tx,
            cancel,
        );
        (reader, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<HeaderBatch>) -> Vec<HeaderBatch> {
        let mut batches = Vec::new();
        while let Ok(batch) = rx.try_recv() {
            batches.push(batch);
        }
        batches
    }

    #[tokio::test]
    async fn delivers_full_batches_then_the_tail() {
        let range = IndexRange::starting_at(1, 10);
        let (mut reader, mut rx) = reader(
            VecRetriever::with_headers(10),
            range,
            4,
            8,
            CancellationToken::new(),
        );

        let outcome = reader.run().await.unwrap();
        assert_eq!(
            outcome,
            ReaderOutcome::Completed(ReaderProgress {
                headers_sent: 10,
                batches_sent: 3
            })
        );

        let batches = drain(&mut rx);
        let sizes: Vec<usize> = batches.iter().map(HeaderBatch::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);

        let numbers: Vec<u64> = batches
            .iter()
            .flat_map(|b| b.headers.iter().map(|h| h.number))
            .collect();
        assert_eq!(numbers, range.iter().collect::<Vec<_>>());
        assert_eq!(batches[1].first, 5);

        // Reader dropped its sender on completion.
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Disconnected);
    }

    #[tokio::test]
    async fn exact_multiple_has_no_tail() {
        let (mut reader, mut rx) = reader(
            VecRetriever::with_headers(8),
            IndexRange::starting_at(1, 8),
            4,
            8,
            CancellationToken::new(),
        );

        reader.run().await.unwrap();
        let sizes: Vec<usize> = drain(&mut rx).iter().map(HeaderBatch::len).collect();
        assert_eq!(sizes, vec![4, 4]);
    }

    #[tokio::test]
    async fn empty_range_closes_without_batches() {
        let (mut reader, mut rx) = reader(
            VecRetriever::with_headers(2),
            IndexRange::starting_at(1, 0),
            4,
            1,
            CancellationToken::new(),
        );

        let outcome = reader.run().await.unwrap();
        assert!(outcome.is_completed());
        assert_eq!(outcome.progress().batches_sent, 0);
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Disconnected);
    }

    #[tokio::test]
    async fn retrieval_failure_keeps_channel_open() {
        let (mut reader, mut rx) = reader(
            VecRetriever::with_headers(10).failing_at(6),
            IndexRange::starting_at(1, 10),
            4,
            8,
            CancellationToken::new(),
        );

        let err = reader.run().await.unwrap_err();
        assert!(matches!(err, ProducerError::Retrieve { index: 6, .. }));

        assert_eq!(drain(&mut rx).len(), 1);
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[tokio::test]
    async fn decode_failure_is_fatal() {
        let (mut reader, mut rx) = reader(
            VecRetriever::with_headers(4).corrupt(3),
            IndexRange::starting_at(1, 4),
            2,
            8,
            CancellationToken::new(),
        );

        let err = reader.run().await.unwrap_err();
        assert!(matches!(err, ProducerError::Decode { index: 3, .. }));
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn closed_gate_wins_over_a_ready_send() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (mut reader, mut rx) = reader(
            VecRetriever::with_headers(4),
            IndexRange::starting_at(1, 4),
            2,
            8,
            cancel,
        );

        let outcome = reader.run().await.unwrap();
        assert_eq!(outcome, ReaderOutcome::Cancelled(ReaderProgress::default()));
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[tokio::test]
    async fn blocked_send_unblocks_on_cancel() {
        let cancel = CancellationToken::new();
        let (mut reader, mut rx) = reader(
            VecRetriever::with_headers(3),
            IndexRange::starting_at(1, 3),
            1,
            1,
            cancel.clone(),
        );

        let handle = tokio::spawn(async move { reader.run().await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        cancel.cancel();
        let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("reader did not observe cancellation")
            .unwrap()
            .unwrap();

        assert_eq!(outcome.progress().batches_sent, 1);
        assert!(!outcome.is_completed());
        assert_eq!(rx.recv().await.unwrap().first, 1);
    }

    #[tokio::test]
    async fn oversized_chunk_does_not_reserve_the_whole_range() {
        let (reader_stage, _rx) = reader(
            VecRetriever::with_headers(1),
            IndexRange::starting_at(1, u64::MAX / 2),
            usize::MAX,
            1,
            CancellationToken::new(),
        );
        assert!(reader_stage.buffer().capacity() <= MAX_PREALLOCATED_HEADERS);

        let (mut reader, mut rx) = reader(
            VecRetriever::with_headers(5),
            IndexRange::starting_at(1, 5),
            1 << 40,
            1,
            CancellationToken::new(),
        );
        reader.run().await.unwrap();
        let sizes: Vec<usize> = drain(&mut rx).iter().map(HeaderBatch::len).collect();
        assert_eq!(sizes, vec![5]);
    }
}
