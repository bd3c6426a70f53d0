use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{Collection, Global, GlobalSettings, Test};
use crate::error::{HttpError, MetricsError};
use crate::http::{HttpExecutor, ReqwestExecutor};
use crate::metrics::{MetricsAggregator, MetricsReport};

use super::phase::resolve_phase;
use super::segment::SegmentRunner;

/// Builds the HTTP client used for one test from its global settings.
pub type ClientFactory =
    Box<dyn Fn(&GlobalSettings) -> Result<Arc<dyn HttpExecutor>, HttpError> + Send + Sync>;

/// Factory producing a [`ReqwestExecutor`] per test.
#[must_use]
pub fn reqwest_client_factory() -> ClientFactory {
    Box::new(|settings: &GlobalSettings| {
        let client: Arc<dyn HttpExecutor> = Arc::new(ReqwestExecutor::new(settings)?);
        Ok(client)
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub metrics: MetricsReport,
    /// Phases that were not executed because they failed validation or
    /// their test could not be set up.
    pub skipped_phases: u64,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.metrics)?;
        if self.skipped_phases > 0 {
            write!(f, "Skipped phases: {}", self.skipped_phases)?;
        }
        Ok(())
    }
}

/// Runs every test of a collection, phase by phase, feeding one aggregator.
pub struct Executor {
    collection: Collection,
    metrics: Arc<MetricsAggregator>,
    client_factory: ClientFactory,
}

impl Executor {
    #[must_use]
    pub const fn new(
        collection: Collection,
        metrics: Arc<MetricsAggregator>,
        client_factory: ClientFactory,
    ) -> Self {
        Self {
            collection,
            metrics,
            client_factory,
        }
    }

    /// Starts the metric workers, runs all tests sequentially, drains the
    /// workers, and returns the final report.
    ///
    /// Invalid phases and tests whose client cannot be built are logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics report cannot be read.
    pub async fn run(&self) -> Result<RunReport, MetricsError> {
        info!(
            "Starting collection {}",
            self.collection.name.as_deref().unwrap_or("unnamed")
        );
        self.metrics.start_workers();

        let mut skipped_phases: u64 = 0;
        for test in &self.collection.tests {
            skipped_phases = skipped_phases.saturating_add(self.run_test(test).await);
        }

        if let Err(err) = self.metrics.stop_workers().await {
            warn!("Metric workers did not drain cleanly: {}", err);
        }
        let metrics = self.metrics.report()?;
        info!(
            total_requests = metrics.total_requests,
            skipped_phases, "Execution finished"
        );
        Ok(RunReport {
            metrics,
            skipped_phases,
        })
    }

    /// Runs one test and returns how many of its phases were skipped.
    async fn run_test(&self, test: &Test) -> u64 {
        let phase_count = u64::try_from(test.phases.len()).unwrap_or(u64::MAX);
        info!("Running test {}", test.display_name());

        let settings = match test.global.as_ref().map(Global::settings).transpose() {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                error!("Test {} has invalid global settings: {}", test.display_name(), err);
                return phase_count;
            }
        };
        let client = match (self.client_factory)(&settings) {
            Ok(client) => client,
            Err(err) => {
                error!("Test {} cannot build an HTTP client: {}", test.display_name(), err);
                return phase_count;
            }
        };
        let runner = SegmentRunner::new(client, Arc::clone(&self.metrics), settings.think_time);

        let mut skipped: u64 = 0;
        for phase in &test.phases {
            info!("Phase: {}", phase);
            let segments = match resolve_phase(phase) {
                Ok(segments) => segments,
                Err(err) => {
                    error!("Skipping phase: {}", err);
                    skipped = skipped.saturating_add(1);
                    continue;
                }
            };
            let request = phase.request.as_ref().unwrap_or(&test.request);
            info!("{}", request.summary());

            let stats = runner.run_all(&segments, &test.request).await;
            info!(
                phase = phase.display_name(),
                segments = segments.len(),
                waves = stats.waves,
                iterations = stats.iterations,
                "Phase finished in {:?}",
                stats.elapsed
            );
        }
        skipped
    }
}

/// Resolved segment plan of a collection, rendered without sending traffic.
pub struct Plan<'col>(pub &'col Collection);

impl fmt::Display for Plan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for test in &self.0.tests {
            writeln!(f, "Test {} -> {}", test.display_name(), test.request.summary())?;
            for phase in &test.phases {
                match resolve_phase(phase) {
                    Ok(segments) => {
                        writeln!(
                            f,
                            "  Phase {} ({} segment(s))",
                            phase.display_name(),
                            segments.len()
                        )?;
                        for (index, segment) in segments.iter().enumerate() {
                            let duration = segment
                                .duration
                                .map_or_else(|| "single wave".to_owned(), |d| format!("{:?}", d));
                            writeln!(
                                f,
                                "    #{:<3} target_vus={:<6} duration={}",
                                index, segment.target_vus, duration
                            )?;
                        }
                    }
                    Err(err) => writeln!(f, "  Phase {} skipped: {}", phase.display_name(), err)?,
                }
            }
        }
        Ok(())
    }
}
