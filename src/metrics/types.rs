use std::fmt;
use std::time::Duration;

/// Outcome of one request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestMetric {
    pub duration: Duration,
    pub status_code: u16,
}

impl RequestMetric {
    #[must_use]
    pub const fn new(duration: Duration, status_code: u16) -> Self {
        Self {
            duration,
            status_code,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code < 300
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkMetric {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    Failed,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Passed => f.write_str("passed"),
            CheckStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Response check result. Nothing evaluates checks yet; these events are
/// accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMetric {
    pub id: String,
    pub status: CheckStatus,
}

/// Everything the aggregator's worker pool can be asked to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricEvent {
    Request(RequestMetric),
    Network(NetworkMetric),
    Check(CheckMetric),
}

impl MetricEvent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            MetricEvent::Request(_) => "request",
            MetricEvent::Network(_) => "network",
            MetricEvent::Check(_) => "check",
        }
    }
}
