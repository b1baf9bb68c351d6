use crate::{
    error::ImportError,
    execution::state::{ImportState, StateTracker},
};
use engine_processing::{
    consumer::{DataConsumer, WriterOutcome},
    error::{ConsumerError, ProducerError},
    producer::{DataProducer, ReaderOutcome},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// What each stage returned.
#[derive(Debug)]
pub struct StageResults {
    pub reader: Result<ReaderOutcome, ProducerError>,
    pub writer: Result<WriterOutcome, ConsumerError>,
}

/// Runs both stages concurrently and waits for both.
///
/// A stage that fails closes the gate before its channel endpoint is
/// dropped, so its sibling never waits on a peer that is gone.
pub async fn spawn(
    mut producer: Box<dyn DataProducer>,
    mut consumer: Box<dyn DataConsumer>,
    cancel: CancellationToken,
    state: Arc<StateTracker>,
) -> Result<StageResults, ImportError> {
    info!("Launching workers");

    let producer_cancel = cancel.clone();
    let producer_handle = tokio::spawn(async move {
        let result = producer.run().await;
        match &result {
            Ok(ReaderOutcome::Completed(_)) => {
                state.advance(ImportState::Draining);
            }
            Ok(ReaderOutcome::Cancelled(_)) => {}
            Err(err) => {
                error!("Producer error: {}", err);
                producer_cancel.cancel();
            }
        }
        drop(producer);
        result
    });

    let consumer_cancel = cancel.clone();
    let consumer_handle = tokio::spawn(async move {
        let result = consumer.run().await;
        if let Err(err) = &result {
            error!("Consumer error: {}", err);
            consumer_cancel.cancel();
        }
        drop(consumer);
        result
    });

    let (reader, writer) = tokio::join!(producer_handle, consumer_handle);
    if reader.is_err() || writer.is_err() {
        cancel.cancel();
    }

    Ok(StageResults {
        reader: reader?,
        writer: writer?,
    })
}
