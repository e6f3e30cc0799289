#![forbid(unsafe_code)]

use crate::SuiteReport;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    pub suite: &'static str,
    pub case_count: usize,
    pub pass_count: usize,
    pub failures: Vec<String>,
}

impl From<SuiteReport> for SuiteSummary {
    fn from(report: SuiteReport) -> Self {
        Self {
            suite: report.suite,
            case_count: report.case_count,
            pass_count: report.pass_count,
            failures: report.failures,
        }
    }
}

/// Machine-readable verdict printed by the regression gate binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateSummary {
    pub status: GateStatus,
    pub case_log: Option<String>,
    pub suites: Vec<SuiteSummary>,
}

impl GateSummary {
    /// Fails when any suite has a failing case. No suites at all is a pass.
    #[must_use]
    pub fn from_reports(reports: Vec<SuiteReport>, case_log: Option<&Path>) -> Self {
        let status = if reports.iter().all(SuiteReport::all_passed) {
            GateStatus::Pass
        } else {
            GateStatus::Fail
        };
        Self {
            status,
            case_log: case_log.map(|path| path.display().to_string()),
            suites: reports.into_iter().map(SuiteSummary::from).collect(),
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == GateStatus::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::{GateStatus, GateSummary};
    use crate::SuiteReport;
    use std::path::Path;

    fn report(suite: &'static str, case_count: usize, failures: &[&str]) -> SuiteReport {
        SuiteReport {
            suite,
            case_count,
            pass_count: case_count - failures.len(),
            failures: failures.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn any_failing_suite_fails_the_gate() {
        let summary = GateSummary::from_reports(
            vec![
                report("question_answering", 6, &[]),
                report(
                    "language_modeling",
                    2,
                    &["test_run_clm_gpt2-xl_single_card: regression on perplexity"],
                ),
            ],
            None,
        );
        assert_eq!(summary.status, GateStatus::Fail);
        assert!(!summary.passed());
        assert_eq!(summary.suites[1].pass_count, 1);
    }

    #[test]
    fn summary_serializes_like_the_gate_output() {
        let summary = GateSummary::from_reports(
            vec![report("multi_card_summarization", 1, &[])],
            Some(Path::new("logs/cases.jsonl")),
        );
        assert!(summary.passed());

        let json = serde_json::to_value(&summary).expect("serializable");
        assert_eq!(json["status"], "pass");
        assert_eq!(json["case_log"], "logs/cases.jsonl");
        assert_eq!(json["suites"][0]["suite"], "multi_card_summarization");
        assert_eq!(json["suites"][0]["case_count"], 1);
    }
}
