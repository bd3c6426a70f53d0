use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use crate::error::{MetricsError, PoolError};
use crate::pool::{PoolConfig, WorkerPool};

use super::histogram::LatencyHistogram;
use super::report::{MetricsReport, PercentileValue, REPORT_PERCENTILES};
use super::types::{CheckMetric, MetricEvent, NetworkMetric, RequestMetric};

#[derive(Debug)]
struct AggregatorState {
    histogram: LatencyHistogram,
    total_requests: u64,
    total_successes: u64,
    total_fails: u64,
    bytes_sent: u64,
    bytes_received: u64,
    record_errors: u64,
}

impl AggregatorState {
    fn apply(&mut self, event: MetricEvent) {
        match event {
            MetricEvent::Request(metric) => self.record_request(metric),
            MetricEvent::Network(metric) => {
                self.bytes_sent = self.bytes_sent.saturating_add(metric.bytes_sent);
                self.bytes_received = self.bytes_received.saturating_add(metric.bytes_recv);
            }
            MetricEvent::Check(check) => {
                trace!(check_id = %check.id, status = %check.status, "Ignoring check metric");
            }
        }
    }

    fn record_request(&mut self, metric: RequestMetric) {
        let latency_ms = u64::try_from(metric.duration.as_millis()).unwrap_or(u64::MAX);
        if let Err(err) = self.histogram.record(latency_ms) {
            self.record_errors = self.record_errors.saturating_add(1);
            warn!("Error recording request latency: {}", err);
        }
        self.total_requests = self.total_requests.saturating_add(1);
        if metric.is_success() {
            self.total_successes = self.total_successes.saturating_add(1);
        } else {
            self.total_fails = self.total_fails.saturating_add(1);
        }
    }
}

/// Latency and outcome aggregator fed through a worker pool.
///
/// Ingestion hands events to the pool so that histogram lock contention
/// stays off the request path. Percentiles and reports can only be read
/// while the workers are stopped, which guarantees every accepted event
/// has been applied.
pub struct MetricsAggregator {
    state: Arc<Mutex<AggregatorState>>,
    pool: WorkerPool<MetricEvent>,
    stopped: AtomicBool,
    dropped_events: AtomicU64,
}

impl MetricsAggregator {
    /// Creates an aggregator whose pool uses `pool_config`. Workers are not
    /// started yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the latency histogram cannot be created.
    pub fn new(pool_config: PoolConfig) -> Result<Self, MetricsError> {
        let state = Arc::new(Mutex::new(AggregatorState {
            histogram: LatencyHistogram::new()?,
            total_requests: 0,
            total_successes: 0,
            total_fails: 0,
            bytes_sent: 0,
            bytes_received: 0,
            record_errors: 0,
        }));
        let handler_state = Arc::clone(&state);
        let pool = WorkerPool::new(pool_config, move |event: MetricEvent| {
            lock(&handler_state).apply(event);
        });

        Ok(Self {
            state,
            pool,
            stopped: AtomicBool::new(true),
            dropped_events: AtomicU64::new(0),
        })
    }

    pub fn start_workers(&self) {
        self.pool.start();
        self.stopped.store(!self.pool.is_running(), Ordering::Release);
    }

    /// Drains and stops the ingestion workers.
    ///
    /// # Errors
    ///
    /// Returns an error when the drain timed out and workers were
    /// terminated with events still pending.
    pub async fn stop_workers(&self) -> Result<(), PoolError> {
        let stats = self.pool.stats();
        debug!(
            workers = stats.workers,
            queued = stats.queued,
            in_flight = stats.in_flight,
            "Draining metric workers"
        );
        let result = self.pool.stop().await;
        self.stopped.store(true, Ordering::Release);
        result
    }

    pub async fn ingest_request_metric(&self, metric: RequestMetric) {
        self.ingest(MetricEvent::Request(metric)).await;
    }

    pub async fn ingest_network_metric(&self, metric: NetworkMetric) {
        self.ingest(MetricEvent::Network(metric)).await;
    }

    pub async fn ingest_check_metric(&self, metric: CheckMetric) {
        self.ingest(MetricEvent::Check(metric)).await;
    }

    async fn ingest(&self, event: MetricEvent) {
        let kind = event.kind();
        if let Err(err) = self.pool.add_task(event).await {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
            warn!("Dropped {} metric: {}", kind, err);
        }
    }

    /// Events that never reached the aggregator because the pool refused them.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    fn ensure_stopped(&self) -> Result<(), MetricsError> {
        if self.stopped.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(MetricsError::WorkersRunning)
        }
    }

    /// Request latency in milliseconds at `percentile`.
    ///
    /// # Errors
    ///
    /// Returns an error while workers are running or when `percentile`
    /// exceeds 100.
    pub fn percentile(&self, percentile: u8) -> Result<u64, MetricsError> {
        self.ensure_stopped()?;
        if percentile > 100 {
            return Err(MetricsError::InvalidPercentile { value: percentile });
        }
        Ok(lock(&self.state).histogram.value_at_percentile(percentile))
    }

    /// Builds the final report.
    ///
    /// # Errors
    ///
    /// Returns an error while workers are still running.
    pub fn report(&self) -> Result<MetricsReport, MetricsError> {
        self.ensure_stopped()?;
        let state = lock(&self.state);
        let percentiles = REPORT_PERCENTILES
            .iter()
            .map(|&percentile| PercentileValue {
                percentile,
                latency_ms: state.histogram.value_at_percentile(percentile),
            })
            .collect();
        debug!(
            total_requests = state.total_requests,
            recorded = state.histogram.count(),
            "Building metrics report"
        );

        Ok(MetricsReport {
            total_requests: state.total_requests,
            total_successes: state.total_successes,
            total_fails: state.total_fails,
            bytes_sent: state.bytes_sent,
            bytes_received: state.bytes_received,
            dropped_events: self.dropped_events(),
            record_errors: state.record_errors,
            min_latency_ms: state.histogram.min(),
            max_latency_ms: state.histogram.max(),
            mean_latency_ms: state.histogram.mean(),
            percentiles,
        })
    }
}

fn lock(state: &Mutex<AggregatorState>) -> MutexGuard<'_, AggregatorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
