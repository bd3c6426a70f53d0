use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::config::RequestTemplate;
use crate::http::HttpExecutor;
use crate::metrics::{MetricsAggregator, NetworkMetric, RequestMetric};

use super::phase::Segment;

/// What one segment run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentStats {
    pub waves: u64,
    pub iterations: u64,
    pub elapsed: Duration,
}

impl SegmentStats {
    pub(crate) const fn absorb(&mut self, other: Self) {
        self.waves = self.waves.saturating_add(other.waves);
        self.iterations = self.iterations.saturating_add(other.iterations);
        self.elapsed = self.elapsed.saturating_add(other.elapsed);
    }
}

/// Runs closed-loop waves of virtual users for a segment.
///
/// Each wave spawns `target_vus` iterations and waits for all of them
/// before the next wave starts, so `target_vus` bounds concurrency, not
/// request rate. The duration is only checked between waves.
pub struct SegmentRunner {
    client: Arc<dyn HttpExecutor>,
    metrics: Arc<MetricsAggregator>,
    think_time: Option<Duration>,
}

impl SegmentRunner {
    #[must_use]
    pub const fn new(
        client: Arc<dyn HttpExecutor>,
        metrics: Arc<MetricsAggregator>,
        think_time: Option<Duration>,
    ) -> Self {
        Self {
            client,
            metrics,
            think_time,
        }
    }

    /// Runs `segments` one after another.
    pub async fn run_all(&self, segments: &[Segment], base: &RequestTemplate) -> SegmentStats {
        let mut total = SegmentStats::default();
        for (index, segment) in segments.iter().enumerate() {
            let stats = self.run(segment, base).await;
            debug!(
                segment = index,
                target_vus = segment.target_vus,
                waves = stats.waves,
                iterations = stats.iterations,
                "Segment finished in {:?}",
                stats.elapsed
            );
            total.absorb(stats);
        }
        total
    }

    pub async fn run(&self, segment: &Segment, base: &RequestTemplate) -> SegmentStats {
        if segment.target_vus == 0 {
            warn!("Segment has no virtual users, nothing to run");
            return SegmentStats::default();
        }
        let request = Arc::new(segment.effective_request(base).clone());
        let start = Instant::now();
        let mut stats = SegmentStats::default();

        loop {
            let completed = self.run_wave(segment.target_vus, &request).await;
            stats.waves = stats.waves.saturating_add(1);
            stats.iterations = stats.iterations.saturating_add(completed);

            let done = segment
                .duration
                .is_none_or(|duration| start.elapsed() >= duration);
            if done {
                break;
            }
        }

        stats.elapsed = start.elapsed();
        stats
    }

    async fn run_wave(&self, target_vus: u32, request: &Arc<RequestTemplate>) -> u64 {
        let mut wave = JoinSet::new();
        for _ in 0..target_vus {
            wave.spawn(run_iteration(
                Arc::clone(&self.client),
                Arc::clone(&self.metrics),
                Arc::clone(request),
                self.think_time,
            ));
        }

        let mut completed: u64 = 0;
        while let Some(result) = wave.join_next().await {
            match result {
                Ok(()) => completed = completed.saturating_add(1),
                Err(err) => warn!("Virtual user task failed: {}", err),
            }
        }
        completed
    }
}

async fn run_iteration(
    client: Arc<dyn HttpExecutor>,
    metrics: Arc<MetricsAggregator>,
    request: Arc<RequestTemplate>,
    think_time: Option<Duration>,
) {
    let start = Instant::now();
    match client.execute(&request).await {
        Ok(outcome) => {
            let metric = RequestMetric::new(outcome.elapsed, outcome.status_code);
            if !metric.is_success() {
                debug!(
                    status = outcome.status_code,
                    "Non-2xx response from {}", request.uri
                );
            }
            metrics.ingest_request_metric(metric).await;
            metrics
                .ingest_network_metric(NetworkMetric {
                    bytes_sent: outcome.bytes_sent,
                    bytes_recv: outcome.bytes_received,
                })
                .await;
        }
        Err(err) => {
            warn!("Request failed: {}", err);
            metrics
                .ingest_request_metric(RequestMetric::new(start.elapsed(), 0))
                .await;
        }
    }

    if let Some(think_time) = think_time {
        sleep(think_time).await;
    }
}
