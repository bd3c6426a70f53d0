use std::fmt;

use serde::Serialize;

/// Percentiles printed in every report.
pub const REPORT_PERCENTILES: [u8; 11] = [50, 60, 70, 75, 80, 85, 90, 95, 97, 98, 99];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PercentileValue {
    pub percentile: u8,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub total_requests: u64,
    pub total_successes: u64,
    pub total_fails: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub dropped_events: u64,
    pub record_errors: u64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub mean_latency_ms: f64,
    pub percentiles: Vec<PercentileValue>,
}

impl MetricsReport {
    #[must_use]
    pub fn latency_at(&self, percentile: u8) -> Option<u64> {
        self.percentiles
            .iter()
            .find(|value| value.percentile == percentile)
            .map(|value| value.latency_ms)
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+-----------------+--------------+")?;
        writeln!(f, "| Metric          | Value        |")?;
        writeln!(f, "+-----------------+--------------+")?;
        writeln!(f, "| Total Requests  | {:<12} |", self.total_requests)?;
        writeln!(f, "| Total Successes | {:<12} |", self.total_successes)?;
        writeln!(f, "| Total Fails     | {:<12} |", self.total_fails)?;
        writeln!(f, "| Bytes Sent      | {:<12} |", self.bytes_sent)?;
        writeln!(f, "| Bytes Received  | {:<12} |", self.bytes_received)?;
        if self.dropped_events > 0 {
            writeln!(f, "| Dropped Events  | {:<12} |", self.dropped_events)?;
        }
        if self.record_errors > 0 {
            writeln!(f, "| Record Errors   | {:<12} |", self.record_errors)?;
        }
        writeln!(f, "+-----------------+--------------+")?;
        writeln!(f)?;
        writeln!(
            f,
            "Latency (ms): min {} | mean {:.1} | max {}",
            self.min_latency_ms, self.mean_latency_ms, self.max_latency_ms
        )?;
        writeln!(f, "+------------+-----------+")?;
        writeln!(f, "| Percentile | Latency   |")?;
        writeln!(f, "+------------+-----------+")?;
        for value in &self.percentiles {
            writeln!(f, "| p{:<9} | {:<9} |", value.percentile, value.latency_ms)?;
        }
        write!(f, "+------------+-----------+")
    }
}
