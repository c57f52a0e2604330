use std::path::PathBuf;

use crate::artifacts::ArtifactNames;
use crate::classifier::{ClassifierError, Norm};

/// Settings for one training run.
///
/// The defaults reproduce the reference run: `chat_data.csv` in the working
/// directory, a 20% test split seeded with 42, unigrams and bigrams capped at
/// 500 features, Laplace smoothing, and a sanity check on `"Hello"`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
    pub delimiter: u8,
    pub output_dir: PathBuf,
    pub artifact_names: ArtifactNames,
    /// Fraction of records held out for evaluation, in `(0, 1)`
    pub test_size: f64,
    pub random_state: u64,
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    pub norm: Norm,
    /// Additive smoothing for the classifier
    pub alpha: f64,
    pub sanity_message: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("chat_data.csv"),
            delimiter: b',',
            output_dir: PathBuf::from("."),
            artifact_names: ArtifactNames::default(),
            test_size: 0.2,
            random_state: 42,
            max_features: 500,
            ngram_range: (1, 2),
            norm: Norm::L2,
            alpha: 1.0,
            sanity_message: "Hello".to_string(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ClassifierError::Validation(format!(
                "test_size must be between 0 and 1 (exclusive), got {}",
                self.test_size
            )));
        }
        if self.max_features == 0 {
            return Err(ClassifierError::Validation("max_features must be at least 1".into()));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ClassifierError::Validation(format!(
                "Invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ClassifierError::Validation(format!(
                "alpha must be a non-negative number, got {}",
                self.alpha
            )));
        }
        if self.artifact_names.vectorizer == self.artifact_names.classifier {
            return Err(ClassifierError::Validation(
                "Vectorizer and classifier artifacts need distinct file names".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TrainingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_features, 500);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.sanity_message, "Hello");
    }

    #[test]
    fn test_invalid_settings() {
        let invalid = [
            TrainingConfig { test_size: 0.0, ..Default::default() },
            TrainingConfig { test_size: 1.5, ..Default::default() },
            TrainingConfig { max_features: 0, ..Default::default() },
            TrainingConfig { ngram_range: (2, 1), ..Default::default() },
            TrainingConfig { alpha: -1.0, ..Default::default() },
            TrainingConfig {
                artifact_names: ArtifactNames {
                    vectorizer: "x.bin".into(),
                    classifier: "x.bin".into(),
                },
                ..Default::default()
            },
        ];
        for config in invalid {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }
}
