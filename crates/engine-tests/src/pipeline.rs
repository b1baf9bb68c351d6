#[cfg(test)]
mod tests {
    use crate::utils::{open_store, run_stages, synthetic_headers, write_archive};
    use engine_config::settings::ImportSettingsBuilder;
    use engine_core::{
        chain::ChainStore,
        error::{ChainError, ValidationFailure},
    };
    use engine_processing::{
        consumer::WriterOutcome,
        error::{ConsumerError, ProducerError},
    };
    use engine_runtime::execution::{executor::ImportExecutor, summary::RunPath};
    use model::{core::range::IndexRange, records::synthetic::seal};
    use tempfile::tempdir;
    use tracing_test::traced_test;

    #[traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn two_full_batches_commit_in_order() {
        let archive = tempdir().unwrap();
        let reports = tempdir().unwrap();
        write_archive(archive.path(), &synthetic_headers(4096));

        let settings = ImportSettingsBuilder::new(4096)
            .chunk_size(2048)
            .report_dir(reports.path())
            .build()
            .unwrap();

        let summary = ImportExecutor::new(settings)
            .run(archive.path(), std::future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(summary.path, RunPath::Completed);
        assert_eq!(summary.reader.batches_sent, 2);
        assert_eq!(summary.reader.headers_sent, 4096);
        assert_eq!(summary.head, 4096);

        let series = summary.metrics.series();
        assert_eq!(series.len(), 2);
        assert_eq!(series.headers, vec![2048, 4096]);

        let report: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(summary.report.unwrap()).unwrap(),
        )
        .unwrap();
        assert_eq!(report["series"]["headers"], serde_json::json!([2048, 4096]));

        assert!(logs_contain("Wrote headers"));
        assert!(logs_contain("Removed scratch directory"));
    }

    #[traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn short_range_is_one_partial_batch() {
        let archive = tempdir().unwrap();
        let reports = tempdir().unwrap();
        write_archive(archive.path(), &synthetic_headers(2000));

        let settings = ImportSettingsBuilder::new(1999)
            .chunk_size(2048)
            .report_dir(reports.path())
            .build()
            .unwrap();

        let summary = ImportExecutor::new(settings)
            .run(archive.path(), std::future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(summary.path, RunPath::Completed);
        assert_eq!(summary.reader.batches_sent, 1);
        assert_eq!(summary.head, 1999);
        assert_eq!(summary.metrics.series().headers, vec![1999]);
    }

    #[traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn retrieval_failure_closes_the_gate() {
        let archive = tempdir().unwrap();
        let chain = tempdir().unwrap();
        // Archive ends at index 10; the range asks for 1..=16.
        write_archive(archive.path(), &synthetic_headers(10));
        let store = open_store(chain.path()).await;

        let (results, cancel) = run_stages(
            archive.path(),
            store.clone(),
            IndexRange::starting_at(1, 16),
            4,
        )
        .await;

        assert!(cancel.is_cancelled());
        assert!(matches!(
            results.reader,
            Err(ProducerError::Retrieve { index: 11, .. })
        ));
        assert!(matches!(results.writer, Ok(WriterOutcome::Cancelled(_))));

        let head = store.head().await.unwrap().unwrap().number;
        assert!(head <= 8 && head % 4 == 0);
        assert!(logs_contain("Read error"));
    }

    #[traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn invalid_header_leaves_no_partial_batch() {
        let archive = tempdir().unwrap();
        let chain = tempdir().unwrap();

        let mut headers = synthetic_headers(12);
        // Header 6 sits inside the second batch. Resealing keeps its proof
        // valid, so only the structural rule rejects it.
        headers[6].gas_used = headers[6].gas_limit + 1;
        headers[6] = seal(headers[6].clone());
        write_archive(archive.path(), &headers);
        let store = open_store(chain.path()).await;

        let (results, cancel) = run_stages(
            archive.path(),
            store.clone(),
            IndexRange::starting_at(1, 12),
            4,
        )
        .await;

        assert!(cancel.is_cancelled());
        match results.writer {
            Err(ConsumerError::Validation {
                first: 5,
                source: ChainError::Invalid { number: 6, failure },
                ..
            }) => assert!(matches!(failure, ValidationFailure::GasUsedExceedsLimit { .. })),
            other => panic!("unexpected writer result: {other:?}"),
        }
        // The reader may have finished the range before the gate closed.
        assert!(results.reader.is_ok());

        assert_eq!(store.head().await.unwrap().unwrap().number, 4);
        for number in 5..=12 {
            assert!(store.header_by_number(number).await.unwrap().is_none());
        }
        assert!(logs_contain("Header validation failed"));
    }
}
