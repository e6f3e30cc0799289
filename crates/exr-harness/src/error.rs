//! Error types for the example regression harness

use crate::regression::Comparison;
use exr_registry::{DistributionMode, RegistryError};
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Harness error type
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Invalid harness configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Case tables could not be built
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// No example directory contains the script
    #[error("could not find {example}.py in examples located in {}", .root.display())]
    ScriptNotFound { example: String, root: PathBuf },

    /// More than one example directory contains the script
    #[error(
        "found {} copies of {example}.py in examples located in {}",
        .matches.len(),
        .root.display()
    )]
    AmbiguousScript {
        example: String,
        root: PathBuf,
        matches: Vec<PathBuf>,
    },

    /// The child process could not be started
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The child process ran but did not exit cleanly
    #[error("'{program}' exited with {status}")]
    NonZeroExit { program: String, status: ExitStatus },

    /// The example's requirements could not be installed
    #[error("installing requirements from {} exited with {status}", .path.display())]
    RequirementsInstall { path: PathBuf, status: ExitStatus },

    /// I/O error
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Baseline file lacks the case's task
    #[error("baseline {} has no entry for task '{task}'", .path.display())]
    MissingTask { path: PathBuf, task: String },

    /// Baseline task lacks the case's distribution mode
    #[error("baseline {} has no {mode} distribution for task '{task}'", .path.display())]
    MissingDistribution {
        path: PathBuf,
        task: String,
        mode: DistributionMode,
    },

    /// A baseline or result metric is not a number
    #[error("{origin} value for metric '{metric}' is not numeric: {value}")]
    InvalidMetric {
        metric: String,
        origin: &'static str,
        value: serde_json::Value,
    },

    /// A tracked metric fell outside its tolerance
    #[error(
        "regression on {metric}: {actual} is not {comparison} {threshold} (baseline {baseline})"
    )]
    Regression {
        metric: String,
        actual: f64,
        baseline: f64,
        threshold: f64,
        comparison: Comparison,
    },
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, HarnessError>;
