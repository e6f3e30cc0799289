#![forbid(unsafe_code)]

use crate::{HarnessError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Models should reach at least 99% of their baseline accuracy.
pub const ACCURACY_PERF_FACTOR: f64 = 0.99;
/// Trainings should last at most 5% longer than the baseline.
pub const TRAINING_TIME_PERF_FACTOR: f64 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
}

impl Comparison {
    #[must_use]
    pub fn holds(self, actual: f64, threshold: f64) -> bool {
        match self {
            Self::AtLeast => actual >= threshold,
            Self::AtMost => actual <= threshold,
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AtLeast => f.write_str(">="),
            Self::AtMost => f.write_str("<="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetric {
    pub name: &'static str,
    pub comparison: Comparison,
    pub factor: f64,
}

pub const REGRESSION_METRICS: [RegressionMetric; 4] = [
    RegressionMetric {
        name: "eval_f1",
        comparison: Comparison::AtLeast,
        factor: ACCURACY_PERF_FACTOR,
    },
    // lower is better, so the accuracy factor is mirrored into an upper bound
    RegressionMetric {
        name: "perplexity",
        comparison: Comparison::AtMost,
        factor: 2.0 - ACCURACY_PERF_FACTOR,
    },
    RegressionMetric {
        name: "eval_rougeLsum",
        comparison: Comparison::AtLeast,
        factor: ACCURACY_PERF_FACTOR,
    },
    RegressionMetric {
        name: "train_runtime",
        comparison: Comparison::AtMost,
        factor: TRAINING_TIME_PERF_FACTOR,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCheck {
    pub metric: &'static str,
    pub comparison: Comparison,
    pub baseline: f64,
    pub threshold: f64,
    /// `None` when the run did not report the metric.
    pub actual: Option<f64>,
}

impl MetricCheck {
    #[must_use]
    pub fn skipped(&self) -> bool {
        self.actual.is_none()
    }
}

fn metric_value(
    values: &Map<String, Value>,
    metric: &str,
    origin: &'static str,
) -> Result<Option<f64>> {
    match values.get(metric) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| HarnessError::InvalidMetric {
                metric: metric.to_string(),
                origin,
                value: value.clone(),
            }),
    }
}

/// Compares every tracked metric the baseline defines. Stops at the first
/// metric outside its tolerance.
pub fn check_no_regression(
    results: &Map<String, Value>,
    baseline: &Map<String, Value>,
) -> Result<Vec<MetricCheck>> {
    let mut checks = Vec::new();
    for tracked in &REGRESSION_METRICS {
        let Some(baseline_value) = metric_value(baseline, tracked.name, "baseline")? else {
            continue;
        };
        let threshold = tracked.factor * baseline_value;
        let actual = metric_value(results, tracked.name, "result")?;

        match actual {
            None => {
                tracing::warn!(metric = tracked.name, "metric missing from results, skipping");
            }
            Some(actual) if !tracked.comparison.holds(actual, threshold) => {
                return Err(HarnessError::Regression {
                    metric: tracked.name.to_string(),
                    actual,
                    baseline: baseline_value,
                    threshold,
                    comparison: tracked.comparison,
                });
            }
            Some(actual) => {
                tracing::debug!(
                    metric = tracked.name,
                    actual,
                    threshold,
                    comparison = %tracked.comparison,
                    "metric within tolerance"
                );
            }
        }

        checks.push(MetricCheck {
            metric: tracked.name,
            comparison: tracked.comparison,
            baseline: baseline_value,
            threshold,
            actual,
        });
    }
    Ok(checks)
}
