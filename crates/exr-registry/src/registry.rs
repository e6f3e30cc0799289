#![forbid(unsafe_code)]

use crate::{RegistryError, Result};
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelEntry {
    pub model_type: &'static str,
    pub model_name_or_path: &'static str,
    pub gaudi_config_name: &'static str,
}

/// Checkpoints of one architecture, each paired with its Gaudi configuration.
#[derive(Debug, Clone, Copy)]
pub struct ModelFamily {
    pub model_type: &'static str,
    pub models: &'static [(&'static str, &'static str)],
}

pub const MODELS_TO_TEST: &[ModelFamily] = &[
    ModelFamily {
        model_type: "bert",
        models: &[
            ("bert-base-uncased", "Habana/bert-base-uncased"),
            (
                "bert-large-uncased-whole-word-masking",
                "Habana/bert-large-uncased-whole-word-masking",
            ),
        ],
    },
    ModelFamily {
        model_type: "roberta",
        models: &[
            ("roberta-base", "Habana/roberta-base"),
            ("roberta-large", "Habana/roberta-large"),
        ],
    },
    ModelFamily {
        model_type: "albert",
        models: &[
            ("albert-large-v2", "Habana/albert-large-v2"),
            ("albert-xxlarge-v1", "Habana/albert-xxlarge-v1"),
        ],
    },
    ModelFamily {
        model_type: "distilbert",
        models: &[("distilbert-base-uncased", "Habana/distilbert-base-uncased")],
    },
    ModelFamily {
        model_type: "gpt2",
        models: &[("gpt2", "Habana/gpt2"), ("gpt2-xl", "Habana/gpt2")],
    },
    ModelFamily {
        model_type: "t5",
        models: &[("t5-small", "Habana/t5")],
    },
];

/// model_type -> configuration class.
pub const CONFIG_CLASSES: &[(&str, &str)] = &[
    ("albert", "AlbertConfig"),
    ("bert", "BertConfig"),
    ("distilbert", "DistilBertConfig"),
    ("gpt2", "GPT2Config"),
    ("roberta", "RobertaConfig"),
    ("t5", "T5Config"),
];

const QUESTION_ANSWERING_MAPPING: &[(&str, &str)] = &[
    ("AlbertConfig", "AlbertForQuestionAnswering"),
    ("BertConfig", "BertForQuestionAnswering"),
    ("DistilBertConfig", "DistilBertForQuestionAnswering"),
    ("RobertaConfig", "RobertaForQuestionAnswering"),
];

const SEQUENCE_CLASSIFICATION_MAPPING: &[(&str, &str)] = &[
    ("AlbertConfig", "AlbertForSequenceClassification"),
    ("BertConfig", "BertForSequenceClassification"),
    ("DistilBertConfig", "DistilBertForSequenceClassification"),
    ("GPT2Config", "GPT2ForSequenceClassification"),
    ("RobertaConfig", "RobertaForSequenceClassification"),
];

const CAUSAL_LM_MAPPING: &[(&str, &str)] = &[
    ("BertConfig", "BertLMHeadModel"),
    ("GPT2Config", "GPT2LMHeadModel"),
    ("RobertaConfig", "RobertaForCausalLM"),
];

const SEQ2SEQ_LM_MAPPING: &[(&str, &str)] = &[("T5Config", "T5ForConditionalGeneration")];

const VALID_MODELS_FOR_QUESTION_ANSWERING: &[&str] = &["bert", "roberta", "albert", "distilbert"];
const VALID_MODELS_FOR_SEQUENCE_CLASSIFICATION: &[&str] = &["bert", "roberta", "albert"];
const VALID_MODELS_FOR_LANGUAGE_MODELING: &[&str] = &["gpt2"];
const VALID_SEQ2SEQ_MODELS: &[&str] = &["t5"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    QuestionAnswering,
    SequenceClassification,
    CausalLanguageModeling,
    Seq2SeqLanguageModeling,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::QuestionAnswering,
        TaskKind::SequenceClassification,
        TaskKind::CausalLanguageModeling,
        TaskKind::Seq2SeqLanguageModeling,
    ];

    /// Example script (without extension) that trains this kind of head.
    #[must_use]
    pub fn example_name(self) -> &'static str {
        match self {
            Self::QuestionAnswering => "run_qa",
            Self::SequenceClassification => "run_glue",
            Self::CausalLanguageModeling => "run_clm",
            Self::Seq2SeqLanguageModeling => "run_summarization",
        }
    }

    #[must_use]
    pub fn for_example(example_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.example_name() == example_name)
    }

    /// Configuration class -> model class for architectures with this head.
    #[must_use]
    pub fn model_mapping(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::QuestionAnswering => QUESTION_ANSWERING_MAPPING,
            Self::SequenceClassification => SEQUENCE_CLASSIFICATION_MAPPING,
            Self::CausalLanguageModeling => CAUSAL_LM_MAPPING,
            Self::Seq2SeqLanguageModeling => SEQ2SEQ_LM_MAPPING,
        }
    }

    #[must_use]
    pub fn valid_model_types(self) -> &'static [&'static str] {
        match self {
            Self::QuestionAnswering => VALID_MODELS_FOR_QUESTION_ANSWERING,
            Self::SequenceClassification => VALID_MODELS_FOR_SEQUENCE_CLASSIFICATION,
            Self::CausalLanguageModeling => VALID_MODELS_FOR_LANGUAGE_MODELING,
            Self::Seq2SeqLanguageModeling => VALID_SEQ2SEQ_MODELS,
        }
    }
}

#[must_use]
pub fn config_class(model_type: &str) -> Option<&'static str> {
    CONFIG_CLASSES
        .iter()
        .find(|(kind, _)| *kind == model_type)
        .map(|(_, class)| *class)
}

/// Keeps the models whose configuration class has a model class in
/// `task_mapping` and whose type is listed in `valid_models_for_task`.
/// Both conditions are required.
pub fn supported_models_for_task(
    models_to_test: &[ModelFamily],
    task_mapping: &[(&str, &str)],
    valid_models_for_task: &[&str],
) -> Result<Vec<ModelEntry>> {
    let mut supported = Vec::new();
    for family in models_to_test {
        let config = config_class(family.model_type)
            .ok_or_else(|| RegistryError::UnknownModelType(family.model_type.to_string()))?;
        let in_task_mapping = task_mapping.iter().any(|(class, _)| *class == config);
        let in_valid_models = valid_models_for_task.contains(&family.model_type);
        if !(in_task_mapping && in_valid_models) {
            continue;
        }

        supported.extend(family.models.iter().map(|&(name, gaudi_config)| ModelEntry {
            model_type: family.model_type,
            model_name_or_path: name,
            gaudi_config_name: gaudi_config,
        }));
    }
    Ok(supported)
}

type ScriptModelMap = BTreeMap<&'static str, Vec<ModelEntry>>;

static SCRIPT_TO_MODELS: OnceLock<Result<ScriptModelMap>> = OnceLock::new();

fn build_script_map() -> Result<ScriptModelMap> {
    let mut map = BTreeMap::new();
    for kind in TaskKind::ALL {
        let models = supported_models_for_task(
            MODELS_TO_TEST,
            kind.model_mapping(),
            kind.valid_model_types(),
        )?;
        map.insert(kind.example_name(), models);
    }
    Ok(map)
}

/// Eligible models for an example script, computed once per process.
pub fn script_models(example_name: &str) -> Result<&'static [ModelEntry]> {
    let map = SCRIPT_TO_MODELS
        .get_or_init(build_script_map)
        .as_ref()
        .map_err(RegistryError::clone)?;
    map.get(example_name)
        .map(Vec::as_slice)
        .ok_or_else(|| RegistryError::NoModelsForExample(example_name.to_string()))
}
