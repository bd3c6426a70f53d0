//! Metric events, latency histogram, and the pool-fed aggregator.
mod aggregator;
mod histogram;
mod report;
mod types;


pub use aggregator::MetricsAggregator;
pub use histogram::{LatencyHistogram, MAX_LATENCY_MS, MIN_LATENCY_MS};
pub use report::{MetricsReport, PercentileValue, REPORT_PERCENTILES};
pub use types::{CheckMetric, CheckStatus, MetricEvent, NetworkMetric, RequestMetric};
