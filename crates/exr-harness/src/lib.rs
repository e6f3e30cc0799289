#![forbid(unsafe_code)]

pub mod baseline;
pub mod case;
pub mod error;
pub mod gate;
pub mod regression;
pub mod runner;

pub use case::{CaseOutcome, run_example_case};
pub use error::{HarnessError, Result};
pub use gate::{GateStatus, GateSummary, SuiteSummary};

use exr_registry::{ExampleCase, ExampleSuite, generate_cases};
use std::path::PathBuf;

pub const OVERSIZED_SINGLE_CARD_ENV: &str = "RUN_ALBERT_XXL_1X";
pub const EXAMPLES_DIR_ENV: &str = "EXR_EXAMPLES_DIR";
pub const BASELINE_DIR_ENV: &str = "EXR_BASELINE_DIR";
pub const PYTHON_ENV: &str = "EXR_PYTHON";
pub const PIP_ENV: &str = "EXR_PIP";

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub examples_root: PathBuf,
    pub baseline_root: PathBuf,
    pub python: String,
    pub pip: String,
    pub run_oversized_single_card: bool,
    pub case_log_path: Option<PathBuf>,
}

impl HarnessConfig {
    #[must_use]
    pub fn default_paths() -> Self {
        let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..");
        Self {
            examples_root: repo_root.join("examples"),
            baseline_root: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("baselines"),
            python: "python3".to_string(),
            pip: "pip".to_string(),
            run_oversized_single_card: false,
            case_log_path: None,
        }
    }

    /// Defaults overlaid with the `EXR_*` overrides and `RUN_ALBERT_XXL_1X`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default_paths();
        if let Some(dir) = lookup(EXAMPLES_DIR_ENV) {
            cfg.examples_root = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(BASELINE_DIR_ENV) {
            cfg.baseline_root = PathBuf::from(dir);
        }
        if let Some(python) = lookup(PYTHON_ENV) {
            cfg.python = python;
        }
        if let Some(pip) = lookup(PIP_ENV) {
            cfg.pip = pip;
        }
        if let Some(raw) = lookup(OVERSIZED_SINGLE_CARD_ENV) {
            cfg.run_oversized_single_card = parse_bool_flag(&raw).ok_or_else(|| {
                HarnessError::Config(format!(
                    "invalid truth value {raw:?} for {OVERSIZED_SINGLE_CARD_ENV}"
                ))
            })?;
        }
        Ok(cfg)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::default_paths()
    }
}

/// Accepts the usual yes/no spellings, case-insensitively.
#[must_use]
pub fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub suite: &'static str,
    pub case_count: usize,
    pub pass_count: usize,
    pub failures: Vec<String>,
}

impl SuiteReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.case_count == self.pass_count && self.failures.is_empty()
    }
}

/// Generated cases of `suite` whose name contains `filter`.
pub fn suite_cases(
    config: &HarnessConfig,
    suite: &ExampleSuite,
    filter: Option<&str>,
) -> Result<Vec<ExampleCase>> {
    let mut cases = generate_cases(suite, config.run_oversized_single_card)?;
    if let Some(filter) = filter {
        cases.retain(|case| case.test_name.contains(filter));
    }
    Ok(cases)
}

/// Runs every selected case of `suite`; a failing case is recorded and the
/// next one still runs.
pub fn run_example_suite(
    config: &HarnessConfig,
    suite: &ExampleSuite,
    filter: Option<&str>,
) -> Result<SuiteReport> {
    let cases = suite_cases(config, suite, filter)?;
    let mut report = SuiteReport {
        suite: suite.name,
        case_count: 0,
        pass_count: 0,
        failures: Vec::new(),
    };

    for case in &cases {
        report.case_count += 1;
        match run_example_case(config, case) {
            Ok(_) => report.pass_count += 1,
            Err(err) => {
                tracing::error!(test = %case.test_name, error = %err, "example case failed");
                report.failures.push(format!("{}: {err}", case.test_name));
            }
        }
    }
    Ok(report)
}
