use serde::Serialize;
use std::time::Duration;

/// Cumulative position of the import after one committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimingSample {
    pub headers_committed: u64,
    pub validation_ms: u64,
    pub write_ms: u64,
}

/// Three aligned series, one point per committed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimingSeries {
    pub headers: Vec<u64>,
    pub validation_ms: Vec<u64>,
    pub write_ms: Vec<u64>,
}

impl TimingSeries {
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Validation and write timings accumulated by the writer stage.
#[derive(Debug, Clone, Default)]
pub struct ImportMetrics {
    headers_committed: u64,
    total_validation: Duration,
    total_write: Duration,
    samples: Vec<TimingSample>,
}

impl ImportMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one committed batch to the totals and appends its sample.
    pub fn record_batch(
        &mut self,
        headers: u64,
        validation: Duration,
        write: Duration,
    ) -> TimingSample {
        self.headers_committed += headers;
        self.total_validation += validation;
        self.total_write += write;

        let sample = TimingSample {
            headers_committed: self.headers_committed,
            validation_ms: self.total_validation.as_millis() as u64,
            write_ms: self.total_write.as_millis() as u64,
        };
        self.samples.push(sample);
        sample
    }

    pub fn headers_committed(&self) -> u64 {
        self.headers_committed
    }

    pub fn batches(&self) -> usize {
        self.samples.len()
    }

    pub fn total_validation(&self) -> Duration {
        self.total_validation
    }

    pub fn total_write(&self) -> Duration {
        self.total_write
    }

    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    pub fn series(&self) -> TimingSeries {
        let mut series = TimingSeries {
            headers: Vec::with_capacity(self.samples.len()),
            validation_ms: Vec::with_capacity(self.samples.len()),
            write_ms: Vec::with_capacity(self.samples.len()),
        };
        for sample in &self.samples {
            series.headers.push(sample.headers_committed);
            series.validation_ms.push(sample.validation_ms);
            series.write_ms.push(sample.write_ms);
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_cumulative() {
        let mut metrics = ImportMetrics::new();
        metrics.record_batch(2048, Duration::from_millis(30), Duration::from_millis(5));
        let second =
            metrics.record_batch(2048, Duration::from_millis(20), Duration::from_millis(7));

        assert_eq!(
            second,
            TimingSample {
                headers_committed: 4096,
                validation_ms: 50,
                write_ms: 12,
            }
        );
        assert_eq!(metrics.batches(), 2);
        assert_eq!(metrics.total_validation(), Duration::from_millis(50));
    }

    #[test]
    fn milliseconds_truncate_the_running_total() {
        let mut metrics = ImportMetrics::new();
        metrics.record_batch(1, Duration::from_micros(600), Duration::ZERO);
        metrics.record_batch(1, Duration::from_micros(600), Duration::ZERO);

        // 1.2ms in total, not 0 + 0 from per-batch truncation
        assert_eq!(metrics.samples()[1].validation_ms, 1);
    }

    #[test]
    fn series_are_aligned() {
        let mut metrics = ImportMetrics::new();
        for _ in 0..3 {
            metrics.record_batch(10, Duration::from_millis(1), Duration::from_millis(2));
        }
        let series = metrics.series();
        assert_eq!(series.len(), 3);
        assert_eq!(series.headers, vec![10, 20, 30]);
        assert_eq!(series.validation_ms, vec![1, 2, 3]);
        assert_eq!(series.write_ms, vec![2, 4, 6]);
    }
}
