#![forbid(unsafe_code)]

pub mod cases;
pub mod registry;

pub use cases::{
    ExampleCase, ExampleSuite, OVERSIZED_MODEL, all_suites, find_suite, generate_cases,
};
pub use registry::{ModelEntry, ModelFamily, TaskKind, script_models, supported_models_for_task};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DistributionMode {
    SingleCard,
    MultiCard,
}

impl DistributionMode {
    #[must_use]
    pub fn from_multi_card(multi_card: bool) -> Self {
        if multi_card {
            Self::MultiCard
        } else {
            Self::SingleCard
        }
    }

    #[must_use]
    pub fn is_multi_card(self) -> bool {
        matches!(self, Self::MultiCard)
    }

    /// Key used in baseline documents and generated test names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleCard => "single_card",
            Self::MultiCard => "multi_card",
        }
    }
}

impl std::fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration errors raised while building the case tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No example script of that name is registered.
    #[error("could not create test cases because no model was found for example {0}")]
    NoModelsForExample(String),

    /// A model type has no configuration class.
    #[error("unknown model type '{0}': no configuration class registered")]
    UnknownModelType(String),

    /// Two generated cases collided on the same name.
    #[error("duplicate generated test name {0}")]
    DuplicateTestName(String),

    /// No static suite carries that name.
    #[error("unknown example suite '{0}'")]
    UnknownSuite(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::DistributionMode;

    #[test]
    fn distribution_mode_keys_match_baseline_layout() {
        assert_eq!(DistributionMode::from_multi_card(false).as_str(), "single_card");
        assert_eq!(DistributionMode::from_multi_card(true).to_string(), "multi_card");
        assert!(DistributionMode::MultiCard.is_multi_card());
        assert!(!DistributionMode::SingleCard.is_multi_card());
    }
}
