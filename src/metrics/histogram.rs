use hdrhistogram::{Histogram, RecordError};

use crate::error::MetricsError;

/// Lowest recordable latency in milliseconds.
pub const MIN_LATENCY_MS: u64 = 1;
/// Highest recordable latency in milliseconds.
pub const MAX_LATENCY_MS: u64 = 60_000_000;
/// Significant decimal digits kept per bucket.
const SIGNIFICANT_DIGITS: u8 = 3;

#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a latency histogram covering 1ms to 60_000_000ms at three
    /// significant digits.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist =
            Histogram::<u64>::new_with_bounds(MIN_LATENCY_MS, MAX_LATENCY_MS, SIGNIFICANT_DIGITS)
                .map_err(|err| MetricsError::CreateHistogram { source: err })?;
        Ok(Self { hist })
    }

    /// Record a latency value in milliseconds. Sub-millisecond latencies are
    /// recorded as 1ms.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is above the histogram's upper bound.
    pub fn record(&mut self, latency_ms: u64) -> Result<(), MetricsError> {
        let value = latency_ms.max(MIN_LATENCY_MS);
        // Bucket rounding lets hdrhistogram accept a little past the bound.
        if value > MAX_LATENCY_MS {
            return Err(MetricsError::Record {
                value_ms: value,
                source: RecordError::ValueOutOfRangeResizeDisabled,
            });
        }
        self.hist
            .record(value)
            .map_err(|err| MetricsError::Record {
                value_ms: value,
                source: err,
            })
    }

    /// Latency at `percentile` (0..=100), or 0 when nothing was recorded.
    #[must_use]
    pub fn value_at_percentile(&self, percentile: u8) -> u64 {
        if self.count() == 0 {
            return 0;
        }
        self.hist.value_at_percentile(f64::from(percentile))
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    #[must_use]
    pub fn min(&self) -> u64 {
        if self.count() == 0 { 0 } else { self.hist.min() }
    }

    #[must_use]
    pub fn max(&self) -> u64 {
        if self.count() == 0 { 0 } else { self.hist.max() }
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.hist.mean()
    }
}
