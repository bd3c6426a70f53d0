use clap::Parser;
use std::time::Duration;

use crate::pool::{DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_WORKERS, PoolConfig};

use super::parsers::{parse_duration_arg, parse_positive_usize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Closed-loop HTTP load generator: ramps virtual users through phases and reports latency percentiles."
)]
pub struct TesterArgs {
    /// Path to a .toml or .json collection (defaults to wavebench.toml, then wavebench.json)
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by WAVEBENCH_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Number of workers aggregating metric events
    #[arg(long = "metric-workers", default_value_t = DEFAULT_WORKERS, value_parser = parse_positive_usize)]
    pub metric_workers: usize,

    /// Capacity of the metric event queue
    #[arg(long = "metric-queue", default_value_t = DEFAULT_QUEUE_CAPACITY, value_parser = parse_positive_usize)]
    pub metric_queue: usize,

    /// How long to wait for queued metrics to drain at the end of a run (supports ms/s/m/h)
    #[arg(long = "drain-timeout", value_parser = parse_duration_arg)]
    pub drain_timeout: Option<Duration>,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// Resolve and print the segment plan without sending requests
    #[arg(long)]
    pub plan: bool,
}

impl TesterArgs {
    /// Worker pool settings for the metrics aggregator.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.metric_workers,
            queue_capacity: self.metric_queue,
            shutdown_timeout: self.drain_timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT),
            ..PoolConfig::default()
        }
    }
}
