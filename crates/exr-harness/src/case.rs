#![forbid(unsafe_code)]

use crate::baseline::load_task_baseline;
use crate::regression::{MetricCheck, check_no_regression};
use crate::runner::{
    REQUIREMENTS_FILE, install_requirements, load_results, locate_example_script, run_command,
};
use crate::{HarnessConfig, HarnessError, Result};
use exr_cmdline::{ExampleCommand, TaskOption};
use exr_registry::ExampleCase;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub test_name: String,
    pub baseline_sha256: String,
    pub checks: Vec<MetricCheck>,
    pub elapsed_ms: u128,
}

#[derive(Debug, Serialize)]
struct CaseLogEntry<'a> {
    test_name: &'a str,
    example: &'a str,
    task: &'a str,
    model: &'a str,
    mode: &'static str,
    status: &'static str,
    reason: Option<String>,
    baseline_sha256: Option<&'a str>,
    elapsed_ms: u128,
}

/// Runs one generated case end to end and records it in the case log when
/// one is configured.
pub fn run_example_case(config: &HarnessConfig, case: &ExampleCase) -> Result<CaseOutcome> {
    let started = Instant::now();
    let mut baseline_sha256 = None;
    let result = execute_case(config, case, &mut baseline_sha256, started);

    if let Some(log_path) = &config.case_log_path {
        let logged = append_case_log(
            log_path,
            case,
            &result,
            baseline_sha256.as_deref(),
            started.elapsed(),
        );
        // The log never changes the verdict.
        if let Err(log_err) = logged {
            tracing::warn!(
                test = %case.test_name,
                error = %log_err,
                "failed to record case log entry"
            );
        }
    }
    result
}

fn execute_case(
    config: &HarnessConfig,
    case: &ExampleCase,
    baseline_sha256: &mut Option<String>,
    started: Instant,
) -> Result<CaseOutcome> {
    let _span = tracing::info_span!("example_case", test = %case.test_name).entered();

    let script = locate_example_script(&config.examples_root, case.example_name)?;
    if let Some(example_dir) = script.parent() {
        install_requirements(&config.pip, &example_dir.join(REQUIREMENTS_FILE))?;
    }

    let baseline = load_task_baseline(&config.baseline_root, case.model_name, case.task_name)?;
    *baseline_sha256 = Some(baseline.sha256.clone());
    let distribution = baseline.distribution(case.mode)?;

    let tmp_dir = tempfile::Builder::new()
        .prefix("exr_")
        .tempdir()
        .map_err(|err| HarnessError::io(std::env::temp_dir(), err))?;

    let command = ExampleCommand {
        mode: case.mode,
        python: &config.python,
        script: &script,
        model_name: case.model_name,
        gaudi_config_name: case.gaudi_config_name,
        output_dir: tmp_dir.path(),
        learning_rate: distribution.learning_rate,
        train_batch_size: distribution.train_batch_size,
        eval_batch_size: baseline.task.eval_batch_size,
        num_train_epochs: baseline.task.num_train_epochs,
        task: Some(TaskOption {
            parameter_name: case.dataset_parameter_name,
            task_name: case.task_name,
        }),
        extra_arguments: &distribution.extra_arguments,
    };
    let args = command.to_args();
    tracing::info!(command = %args.join(" "), "launching example");

    run_command(&args)?;
    let results = load_results(tmp_dir.path())?;
    let checks = check_no_regression(&results, &distribution.metrics)?;

    let tmp_path = tmp_dir.path().to_path_buf();
    tmp_dir
        .close()
        .map_err(|err| HarnessError::io(tmp_path, err))?;

    let elapsed_ms = started.elapsed().as_millis();
    tracing::info!(elapsed_ms, checked = checks.len(), "example case passed");
    Ok(CaseOutcome {
        test_name: case.test_name.clone(),
        baseline_sha256: baseline.sha256,
        checks,
        elapsed_ms,
    })
}

fn append_case_log(
    path: &Path,
    case: &ExampleCase,
    result: &Result<CaseOutcome>,
    baseline_sha256: Option<&str>,
    elapsed: Duration,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| HarnessError::io(parent, err))?;
    }

    let entry = CaseLogEntry {
        test_name: &case.test_name,
        example: case.example_name,
        task: case.task_name,
        model: case.model_name,
        mode: case.mode.as_str(),
        status: if result.is_ok() { "pass" } else { "fail" },
        reason: result.as_ref().err().map(ToString::to_string),
        baseline_sha256,
        elapsed_ms: elapsed.as_millis(),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| HarnessError::io(path, err))?;
    let line = serde_json::to_string(&entry).map_err(|err| HarnessError::json(path, err))?;
    let mut payload = line.into_bytes();
    payload.push(b'\n');
    file.write_all(&payload)
        .map_err(|err| HarnessError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::run_example_case;
    use crate::{HarnessConfig, HarnessError};
    use exr_registry::{DistributionMode, ExampleCase};
    use serde_json::Value;
    use std::fs;

    fn case() -> ExampleCase {
        ExampleCase {
            test_name: "test_run_qa_bert-base-uncased_single_card".to_string(),
            example_name: "run_qa",
            task_name: "squad",
            dataset_parameter_name: "dataset_name",
            model_name: "bert-base-uncased",
            gaudi_config_name: "Habana/bert-base-uncased",
            mode: DistributionMode::SingleCard,
        }
    }

    #[test]
    fn failure_before_launch_is_logged_without_fingerprint() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let log_path = scratch.path().join("logs/cases.jsonl");
        let config = HarnessConfig {
            examples_root: scratch.path().join("missing-examples"),
            baseline_root: scratch.path().join("baselines"),
            case_log_path: Some(log_path.clone()),
            ..HarnessConfig::default_paths()
        };

        let err = run_example_case(&config, &case()).expect_err("no examples tree");
        assert!(matches!(err, HarnessError::Io { .. }));

        let raw = fs::read_to_string(&log_path).expect("log written");
        let entry: Value = serde_json::from_str(raw.trim()).expect("jsonl entry");
        assert_eq!(entry["status"], "fail");
        assert_eq!(entry["mode"], "single_card");
        assert_eq!(entry["model"], "bert-base-uncased");
        assert!(entry["baseline_sha256"].is_null());
        assert!(entry["reason"].as_str().is_some_and(|r| r.contains("missing-examples")));
    }
}
