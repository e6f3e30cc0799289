#![forbid(unsafe_code)]

use crate::registry::script_models;
use crate::{DistributionMode, RegistryError, Result};
use std::collections::BTreeSet;

/// Too large for a single card in the time budget; opt-in only.
pub const OVERSIZED_MODEL: &str = "albert-xxlarge-v1";

/// One (example, task, mode) group of generated cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleSuite {
    pub name: &'static str,
    pub example_name: &'static str,
    pub task_name: &'static str,
    pub dataset_parameter_name: &'static str,
    pub mode: DistributionMode,
}

const SUITES: &[ExampleSuite] = &[
    ExampleSuite {
        name: "text_classification",
        example_name: "run_glue",
        task_name: "mrpc",
        dataset_parameter_name: "task_name",
        mode: DistributionMode::SingleCard,
    },
    ExampleSuite {
        name: "multi_card_text_classification",
        example_name: "run_glue",
        task_name: "mrpc",
        dataset_parameter_name: "task_name",
        mode: DistributionMode::MultiCard,
    },
    ExampleSuite {
        name: "question_answering",
        example_name: "run_qa",
        task_name: "squad",
        dataset_parameter_name: "dataset_name",
        mode: DistributionMode::SingleCard,
    },
    ExampleSuite {
        name: "multi_card_question_answering",
        example_name: "run_qa",
        task_name: "squad",
        dataset_parameter_name: "dataset_name",
        mode: DistributionMode::MultiCard,
    },
    ExampleSuite {
        name: "language_modeling",
        example_name: "run_clm",
        task_name: "wikitext",
        dataset_parameter_name: "dataset_name",
        mode: DistributionMode::SingleCard,
    },
    ExampleSuite {
        name: "multi_card_language_modeling",
        example_name: "run_clm",
        task_name: "wikitext",
        dataset_parameter_name: "dataset_name",
        mode: DistributionMode::MultiCard,
    },
    ExampleSuite {
        name: "multi_card_summarization",
        example_name: "run_summarization",
        task_name: "cnn_dailymail",
        dataset_parameter_name: "dataset_name",
        mode: DistributionMode::MultiCard,
    },
];

#[must_use]
pub fn all_suites() -> &'static [ExampleSuite] {
    SUITES
}

pub fn find_suite(name: &str) -> Result<&'static ExampleSuite> {
    SUITES
        .iter()
        .find(|suite| suite.name == name)
        .ok_or_else(|| RegistryError::UnknownSuite(name.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleCase {
    pub test_name: String,
    pub example_name: &'static str,
    pub task_name: &'static str,
    pub dataset_parameter_name: &'static str,
    pub model_name: &'static str,
    pub gaudi_config_name: &'static str,
    pub mode: DistributionMode,
}

#[must_use]
pub fn test_name(example_name: &str, model_name: &str, mode: DistributionMode) -> String {
    format!("test_{example_name}_{model_name}_{mode}")
}

fn include_model(model_name: &str, mode: DistributionMode, run_oversized_single_card: bool) -> bool {
    model_name != OVERSIZED_MODEL || mode.is_multi_card() || run_oversized_single_card
}

/// Enumerates one case per eligible model of the suite's example script.
pub fn generate_cases(
    suite: &ExampleSuite,
    run_oversized_single_card: bool,
) -> Result<Vec<ExampleCase>> {
    let models = script_models(suite.example_name)?;
    if models.is_empty() {
        return Err(RegistryError::NoModelsForExample(
            suite.example_name.to_string(),
        ));
    }

    let mut seen = BTreeSet::new();
    let mut cases = Vec::with_capacity(models.len());
    for entry in models {
        if !include_model(entry.model_name_or_path, suite.mode, run_oversized_single_card) {
            continue;
        }

        let name = test_name(suite.example_name, entry.model_name_or_path, suite.mode);
        if !seen.insert(name.clone()) {
            return Err(RegistryError::DuplicateTestName(name));
        }

        cases.push(ExampleCase {
            test_name: name,
            example_name: suite.example_name,
            task_name: suite.task_name,
            dataset_parameter_name: suite.dataset_parameter_name,
            model_name: entry.model_name_or_path,
            gaudi_config_name: entry.gaudi_config_name,
            mode: suite.mode,
        });
    }
    Ok(cases)
}
