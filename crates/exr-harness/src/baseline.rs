#![forbid(unsafe_code)]

use crate::{HarnessError, Result};
use exr_registry::DistributionMode;
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct TaskBaseline {
    pub num_train_epochs: f64,
    pub eval_batch_size: u32,
    pub distribution: BTreeMap<String, DistributionBaseline>,
}

/// Hyperparameters and metric targets for one distribution mode.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionBaseline {
    pub learning_rate: f64,
    pub train_batch_size: u32,
    #[serde(default)]
    pub extra_arguments: Vec<String>,
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct LoadedBaseline {
    pub path: PathBuf,
    pub task_name: String,
    pub sha256: String,
    pub task: TaskBaseline,
}

impl LoadedBaseline {
    pub fn distribution(&self, mode: DistributionMode) -> Result<&DistributionBaseline> {
        self.task
            .distribution
            .get(mode.as_str())
            .ok_or_else(|| HarnessError::MissingDistribution {
                path: self.path.clone(),
                task: self.task_name.clone(),
                mode,
            })
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

/// `bert-base-uncased` -> `<root>/bert_base_uncased.json`
#[must_use]
pub fn baseline_path(baseline_root: &Path, model_name: &str) -> PathBuf {
    baseline_root.join(format!("{}.json", model_name.replace('-', "_")))
}

pub fn load_task_baseline(
    baseline_root: &Path,
    model_name: &str,
    task_name: &str,
) -> Result<LoadedBaseline> {
    let path = baseline_path(baseline_root, model_name);
    let raw = fs::read(&path).map_err(|err| HarnessError::io(&path, err))?;
    let mut document: BTreeMap<String, Value> =
        serde_json::from_slice(&raw).map_err(|err| HarnessError::json(&path, err))?;

    let Some(entry) = document.remove(task_name) else {
        return Err(HarnessError::MissingTask {
            path,
            task: task_name.to_string(),
        });
    };
    let task: TaskBaseline =
        serde_json::from_value(entry).map_err(|err| HarnessError::json(&path, err))?;

    Ok(LoadedBaseline {
        sha256: sha256_hex(&raw),
        path,
        task_name: task_name.to_string(),
        task,
    })
}
