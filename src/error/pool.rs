use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Worker pool not started.")]
    NotStarted,
    #[error("Worker pool is shutting down.")]
    ShuttingDown,
    #[error("Worker pool queue stayed full for {waited:?}; task dropped.")]
    Saturated { waited: Duration },
    #[error("Worker pool did not drain within {timeout:?}; {pending} task(s) abandoned.")]
    ShutdownTimeout { timeout: Duration, pending: u64 },
}
