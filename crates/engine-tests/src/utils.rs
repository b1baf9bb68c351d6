use engine_core::{
    archive::{
        HEADERS_TABLE,
        freezer::{FreezerTable, FreezerWriter},
    },
    chain::{
        ChainStore,
        sled_store::{SledChainStore, ValidatorConfig},
    },
};
use engine_processing::{
    consumer::headers::HeaderWriter,
    producer::{config::ProducerConfig, headers::HeaderReader},
};
use engine_runtime::execution::{
    state::StateTracker,
    workers::{self, StageResults},
};
use model::{
    core::range::IndexRange,
    records::{codec::BincodeHeaderCodec, header::Header, synthetic::SyntheticChain},
};
use std::{num::NonZeroUsize, path::Path, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Genesis followed by `count` valid synthetic headers, indexed by number.
pub fn synthetic_headers(count: usize) -> Vec<Header> {
    let mut headers = vec![Header::genesis()];
    headers.extend(SyntheticChain::from_genesis().generate(count));
    headers
}

/// Writes `headers` to a fresh `headers` table in `dir`.
pub fn write_archive(dir: &Path, headers: &[Header]) {
    let codec = BincodeHeaderCodec;
    let mut writer = FreezerWriter::create(dir, HEADERS_TABLE).expect("create archive");
    for header in headers {
        writer
            .append(&codec.encode(header).expect("encode header"))
            .expect("append header");
    }
    writer.finish().expect("finish archive");
}

pub async fn open_store(dir: &Path) -> Arc<SledChainStore> {
    let store = SledChainStore::open(dir.join("chaindata"), ValidatorConfig::default())
        .expect("open chain store");
    store
        .init_genesis(&Header::genesis())
        .await
        .expect("init genesis");
    Arc::new(store)
}

/// Wires a reader over the archive in `archive_dir` to a writer on `store`
/// and runs both to completion.
pub async fn run_stages(
    archive_dir: &Path,
    store: Arc<SledChainStore>,
    range: IndexRange,
    chunk_size: usize,
) -> (StageResults, CancellationToken) {
    let table = FreezerTable::open(archive_dir, HEADERS_TABLE)
        .await
        .expect("open archive");
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel(1);

    let reader = HeaderReader::new(
        ProducerConfig::new(range, NonZeroUsize::new(chunk_size).expect("chunk size")),
        Arc::new(table),
        Arc::new(BincodeHeaderCodec),
        tx,
        cancel.clone(),
    );
    let writer = HeaderWriter::new(rx, store, cancel.clone());

    let results = tokio::time::timeout(
        Duration::from_secs(30),
        workers::spawn(
            Box::new(reader),
            Box::new(writer),
            cancel.clone(),
            Arc::new(StateTracker::new()),
        ),
    )
    .await
    .expect("stages did not terminate")
    .expect("join stages");

    (results, cancel)
}
