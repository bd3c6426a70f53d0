use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to create histogram: {source}")]
    CreateHistogram {
        #[source]
        source: hdrhistogram::CreationError,
    },
    #[error("Failed to record latency {value_ms}ms: {source}")]
    Record {
        value_ms: u64,
        #[source]
        source: hdrhistogram::RecordError,
    },
    #[error("Metric workers are still running; stop them before reading percentiles.")]
    WorkersRunning,
    #[error("Percentile {value} is outside 0..=100.")]
    InvalidPercentile { value: u8 },
}
