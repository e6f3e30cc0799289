#![forbid(unsafe_code)]

pub mod tokenize;

pub use tokenize::{split_fragment, split_fragments};

use exr_registry::DistributionMode;
use std::path::{Path, PathBuf};

pub const SPAWNER_SCRIPT: &str = "gaudi_spawn.py";
pub const WORLD_SIZE: u32 = 8;
pub const THROUGHPUT_WARMUP_STEPS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOption<'a> {
    pub parameter_name: &'a str,
    pub task_name: &'a str,
}

/// Everything needed to launch one example training run.
#[derive(Debug, Clone)]
pub struct ExampleCommand<'a> {
    pub mode: DistributionMode,
    pub python: &'a str,
    pub script: &'a Path,
    pub model_name: &'a str,
    pub gaudi_config_name: &'a str,
    pub output_dir: &'a Path,
    pub learning_rate: f64,
    pub train_batch_size: u32,
    pub eval_batch_size: u32,
    pub num_train_epochs: f64,
    pub task: Option<TaskOption<'a>>,
    pub extra_arguments: &'a [String],
}

impl ExampleCommand<'_> {
    /// The spawner sits at the root of the examples tree, two levels above
    /// the script.
    #[must_use]
    pub fn spawner_path(&self) -> PathBuf {
        self.script
            .parent()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""))
            .join(SPAWNER_SCRIPT)
    }

    /// Unsplit `--flag value` fragments, in launch order.
    #[must_use]
    pub fn fragments(&self) -> Vec<String> {
        let mut fragments = vec![self.python.to_string()];
        if self.mode.is_multi_card() {
            fragments.push(self.spawner_path().display().to_string());
            fragments.push(format!("--world_size {WORLD_SIZE}"));
            fragments.push("--use_mpi".to_string());
        }

        let task_option = self.task.map_or_else(String::new, |task| {
            format!("--{} {}", task.parameter_name, task.task_name)
        });

        fragments.extend([
            self.script.display().to_string(),
            format!("--model_name_or_path {}", self.model_name),
            format!("--gaudi_config_name {}", self.gaudi_config_name),
            task_option,
            "--do_train".to_string(),
            "--do_eval".to_string(),
            format!("--output_dir {}", self.output_dir.display()),
            "--overwrite_output_dir".to_string(),
            format!("--learning_rate {}", self.learning_rate),
            format!("--per_device_train_batch_size {}", self.train_batch_size),
            format!("--per_device_eval_batch_size {}", self.eval_batch_size),
            format!("--num_train_epochs {}", self.num_train_epochs),
            "--use_habana".to_string(),
            "--use_lazy_mode".to_string(),
            format!("--throughput_warmup_steps {THROUGHPUT_WARMUP_STEPS}"),
        ]);
        fragments.extend(self.extra_arguments.iter().cloned());
        fragments
    }

    /// Flat argv, program first.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        split_fragments(&self.fragments())
    }
}
