use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV_VARS: [&str; 2] = ["WAVEBENCH_LOG", "RUST_LOG"];

/// Installs the global stderr subscriber. Later calls keep the first one.
pub fn init_logging(verbose: bool, no_color: bool) {
    let configured = LOG_ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok());
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(verbose, configured.as_deref()))
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// Filter from the configured directives, else `debug`/`info` by verbosity.
/// Unparsable directives fall back to `info`.
fn log_filter(verbose: bool, configured: Option<&str>) -> EnvFilter {
    configured.map_or_else(
        || EnvFilter::new(if verbose { "debug" } else { "info" }),
        |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
    )
}
