#![forbid(unsafe_code)]

use clap::Parser;
use exr_harness::{GateSummary, HarnessConfig, run_example_suite, suite_cases};
use exr_registry::{ExampleSuite, all_suites, find_suite};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "run_example_regression")]
#[command(about = "Run example training scripts and gate their metrics against baselines")]
struct Cli {
    /// Suite to run (repeatable). Defaults to every suite.
    #[arg(long = "suite")]
    suites: Vec<String>,

    /// Only run cases whose test name contains this substring.
    #[arg(long = "case")]
    case_filter: Option<String>,

    /// Print the generated test names and exit without running anything.
    #[arg(long)]
    list: bool,

    /// Append one JSON line per executed case to this file.
    #[arg(long)]
    log_path: Option<PathBuf>,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("run_example_regression failed: {err}");
        std::process::exit(1);
    }
}

fn selected_suites(names: &[String]) -> Result<Vec<&'static ExampleSuite>, String> {
    if names.is_empty() {
        return Ok(all_suites().iter().collect());
    }
    names
        .iter()
        .map(|name| find_suite(name).map_err(|err| err.to_string()))
        .collect()
}

fn run(cli: Cli) -> Result<(), String> {
    let mut cfg = HarnessConfig::from_env().map_err(|err| err.to_string())?;
    cfg.case_log_path = cli.log_path;
    let suites = selected_suites(&cli.suites)?;
    let filter = cli.case_filter.as_deref();

    if cli.list {
        for suite in suites {
            for case in suite_cases(&cfg, suite, filter).map_err(|err| err.to_string())? {
                println!("{}", case.test_name);
            }
        }
        return Ok(());
    }

    let mut reports = Vec::with_capacity(suites.len());
    for suite in suites {
        tracing::info!(suite = suite.name, mode = %suite.mode, "running example suite");
        reports.push(run_example_suite(&cfg, suite, filter).map_err(|err| err.to_string())?);
    }

    let summary = GateSummary::from_reports(reports, cfg.case_log_path.as_deref());
    let summary_json = serde_json::to_string_pretty(&summary)
        .map_err(|err| format!("failed serializing summary: {err}"))?;
    println!("{summary_json}");

    if !summary.passed() {
        std::process::exit(2);
    }
    Ok(())
}
