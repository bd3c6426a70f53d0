use super::*;
use crate::pool::{DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_WORKERS};
use clap::Parser;
use std::time::Duration;

#[test]
fn parse_args_defaults() -> Result<(), String> {
    let args = TesterArgs::try_parse_from(["wavebench"])
        .map_err(|err| format!("Expected parse success: {}", err))?;
    if args.config.is_some() || args.verbose || args.json || args.plan {
        return Err(format!("Unexpected defaults: {:?}", args));
    }
    let pool = args.pool_config();
    if pool.workers != DEFAULT_WORKERS || pool.shutdown_timeout != DEFAULT_SHUTDOWN_TIMEOUT {
        return Err(format!("Unexpected pool config: {:?}", pool));
    }
    Ok(())
}

#[test]
fn parse_args_config_and_metric_options() -> Result<(), String> {
    let args = TesterArgs::try_parse_from([
        "wavebench",
        "suite.toml",
        "--metric-workers",
        "4",
        "--metric-queue",
        "500",
        "--drain-timeout",
        "5s",
        "--json",
        "-v",
    ])
    .map_err(|err| format!("Expected parse success: {}", err))?;

    if args.config.as_deref() != Some("suite.toml") {
        return Err("Unexpected config path".to_owned());
    }
    if !args.json || !args.verbose {
        return Err("Expected --json and --verbose".to_owned());
    }
    let pool = args.pool_config();
    if pool.workers != 4
        || pool.queue_capacity != 500
        || pool.shutdown_timeout != Duration::from_secs(5)
    {
        return Err(format!("Unexpected pool config: {:?}", pool));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_workers() -> Result<(), String> {
    match TesterArgs::try_parse_from(["wavebench", "--metric-workers", "0"]) {
        Ok(args) => Err(format!("Expected parse failure, got {:?}", args)),
        Err(_) => Ok(()),
    }
}

#[test]
fn parse_args_rejects_bad_drain_timeout() -> Result<(), String> {
    match TesterArgs::try_parse_from(["wavebench", "--drain-timeout", "soon"]) {
        Ok(args) => Err(format!("Expected parse failure, got {:?}", args)),
        Err(_) => Ok(()),
    }
}
