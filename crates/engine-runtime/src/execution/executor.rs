use crate::{
    error::ImportError,
    execution::{
        scratch::ScratchDir,
        state::{ImportState, StateTracker},
        summary::{ImportSummary, RunPath},
        workers::{self, StageResults},
    },
    shutdown::InterruptListener,
};
use engine_config::{
    report::{ReportSink, metrics::JsonReportWriter},
    settings::ImportSettings,
};
use engine_core::{
    archive::{Retriever, freezer::FreezerTable},
    chain::{
        ChainStore,
        rules::HeaderRules,
        sled_store::{SledChainStore, ValidatorConfig},
    },
};
use engine_processing::{
    consumer::{WriterOutcome, headers::HeaderWriter},
    producer::{ReaderOutcome, config::ProducerConfig, headers::HeaderReader},
};
use model::records::{codec::BincodeHeaderCodec, header::Header};
use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Imports the configured range from the archive at `archive_dir`, stopping
/// early when `interrupt` resolves.
pub async fn run<F>(
    settings: ImportSettings,
    archive_dir: &Path,
    interrupt: F,
) -> Result<ImportSummary, ImportError>
where
    F: Future<Output = ()> + Send + 'static,
{
    ImportExecutor::new(settings).run(archive_dir, interrupt).await
}

/// Coordinates one import: scratch storage, genesis, both stages, the
/// interrupt listener and the final report.
pub struct ImportExecutor {
    settings: ImportSettings,
    cancel: CancellationToken,
    state: Arc<StateTracker>,
    report_sink: Arc<dyn ReportSink>,
    scratch_parent: Option<PathBuf>,
}

impl ImportExecutor {
    pub fn new(settings: ImportSettings) -> Self {
        let report_sink = Arc::new(JsonReportWriter::new(
            settings.report_dir.clone(),
            settings.report_name.clone(),
        ));
        Self {
            settings,
            cancel: CancellationToken::new(),
            state: Arc::new(StateTracker::new()),
            report_sink,
            scratch_parent: None,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.report_sink = sink;
        self
    }

    /// Create the scratch directory under `parent` instead of the system
    /// temp dir.
    pub fn with_scratch_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(parent.into());
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<ImportState> {
        self.state.subscribe()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run<F>(self, archive_dir: &Path, interrupt: F) -> Result<ImportSummary, ImportError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.arm_listener(interrupt).await;
        let result = match self.open_archive(archive_dir).await {
            Ok(table) => self.import(Arc::new(table)).await,
            Err(e) => Err(e),
        };
        listener.abort();
        result
    }

    pub async fn run_with_archive<F>(
        self,
        archive: Arc<dyn Retriever>,
        interrupt: F,
    ) -> Result<ImportSummary, ImportError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.arm_listener(interrupt).await;
        let result = self.import(archive).await;
        listener.abort();
        result
    }

    /// Arms the listener before any setup work so an interrupt during setup
    /// still goes through the gate and the scratch directory is removed.
    async fn arm_listener<F>(&self, interrupt: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = InterruptListener::new(self.cancel.clone(), self.state.clone());
        let handle = listener.arm(interrupt);
        // Signal handlers are installed on the listener's first poll.
        tokio::task::yield_now().await;
        handle
    }

    async fn open_archive(&self, archive_dir: &Path) -> Result<FreezerTable, ImportError> {
        let table = FreezerTable::open(archive_dir, &self.settings.table).await?;
        let range = self.settings.range();
        if range.to > table.items() {
            warn!(
                table = table.name(),
                items = table.items(),
                to = range.to,
                "Requested range extends past the end of the archive"
            );
        }
        Ok(table)
    }

    fn ensure_running(&self, step: &'static str) -> Result<(), ImportError> {
        if self.cancel.is_cancelled() {
            self.state.advance(ImportState::Terminated);
            info!(step, "Shutdown requested before the stages started");
            return Err(ImportError::ShutdownRequested);
        }
        Ok(())
    }

    async fn import(&self, archive: Arc<dyn Retriever>) -> Result<ImportSummary, ImportError> {
        let started = Instant::now();
        let range = self.settings.range();
        info!(
            from = range.from,
            count = range.len(),
            chunk_size = self.settings.chunk_size(),
            "Starting header import"
        );
        self.ensure_running("archive")?;

        let scratch = ScratchDir::provision(self.scratch_parent.as_deref())
            .map_err(ImportError::Scratch)?;
        self.ensure_running("scratch")?;
        let store = Arc::new(self.open_store(&scratch)?);
        self.ensure_running("store")?;

        let genesis = Header::genesis();
        store.init_genesis(&genesis).await?;
        info!(hash = %genesis.hash(), "Chain initialised with genesis");
        self.ensure_running("genesis")?;

        let (batch_tx, batch_rx) = mpsc::channel(self.settings.channel_capacity());
        let reader = HeaderReader::new(
            ProducerConfig::new(range, self.settings.chunk_size),
            archive,
            Arc::new(BincodeHeaderCodec),
            batch_tx,
            self.cancel.clone(),
        );
        let writer = HeaderWriter::new(batch_rx, store.clone(), self.cancel.clone());

        let results = workers::spawn(
            Box::new(reader),
            Box::new(writer),
            self.cancel.clone(),
            self.state.clone(),
        )
        .await;
        self.state.advance(ImportState::Terminated);

        let StageResults { reader, writer } = results?;
        let reader = reader?;
        let writer = writer?;

        let head = store
            .head()
            .await?
            .map(|h| h.number)
            .unwrap_or(genesis.number);

        let completed = matches!(
            (&reader, &writer),
            (ReaderOutcome::Completed(_), WriterOutcome::Completed(_))
        );
        let metrics = writer.into_metrics();

        let report = if completed {
            let path = self.report_sink.publish(&metrics.series()).await?;
            info!(path = %path.display(), "Timing report written");
            Some(path)
        } else {
            info!(
                head,
                headers = metrics.headers_committed(),
                "Import interrupted, skipping report"
            );
            None
        };

        let summary = ImportSummary {
            path: if completed {
                RunPath::Completed
            } else {
                RunPath::Interrupted
            },
            reader: reader.progress(),
            head,
            metrics,
            report,
            elapsed: started.elapsed(),
        };

        info!(
            head = summary.head,
            headers = summary.metrics.headers_committed(),
            batches = summary.metrics.batches(),
            elapsed = ?summary.elapsed,
            validation = ?summary.metrics.total_validation(),
            write = ?summary.metrics.total_write(),
            "Header import finished"
        );

        drop(store);
        drop(scratch);
        Ok(summary)
    }

    fn open_store(&self, scratch: &ScratchDir) -> Result<SledChainStore, ImportError> {
        let config = ValidatorConfig {
            concurrency: self.settings.validation_concurrency(),
            rules: HeaderRules::new(self.settings.seal_check_interval()),
        };
        Ok(SledChainStore::open(scratch.chain_path(), config)?)
    }
}
