use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};

use crate::args::TesterArgs;
use crate::config::{Collection, DEFAULT_CONFIG_FILES, load_config};
use crate::error::AppResult;
use crate::metrics::MetricsAggregator;
use crate::runner::{Executor, Plan, RunReport, reqwest_client_factory};

enum RunPlan {
    Print(Collection),
    Execute {
        args: TesterArgs,
        collection: Collection,
    },
}

/// CLI entry point: parses arguments, loads the collection, and runs it.
///
/// # Errors
///
/// Returns an error when arguments are invalid, the config cannot be
/// loaded, or the runtime or report output fails.
pub fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    let collection = load_config(args.config.as_deref())?;
    let plan = if args.plan {
        RunPlan::Print(collection)
    } else {
        RunPlan::Execute { args, collection }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(execute_plan(plan))
}

fn parse_args() -> AppResult<Option<TesterArgs>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    Ok(Some(TesterArgs::from_arg_matches(&matches)?))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    match plan {
        RunPlan::Print(collection) => {
            print!("{}", Plan(&collection));
            Ok(())
        }
        RunPlan::Execute { args, collection } => {
            let metrics = Arc::new(MetricsAggregator::new(args.pool_config())?);
            let executor = Executor::new(collection, metrics, reqwest_client_factory());
            let report = executor.run().await?;
            print_report(&report, args.json)
        }
    }
}

fn print_report(report: &RunReport, json: bool) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    if report.skipped_phases > 0 {
        tracing::warn!(
            "{} phase(s) were skipped; see the log above for details.",
            report.skipped_phases
        );
    }
    Ok(())
}
