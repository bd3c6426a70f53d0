mod app;
mod config;
mod http;
mod metrics;
mod phase;
mod pool;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use phase::PhaseError;
pub use pool::PoolError;
