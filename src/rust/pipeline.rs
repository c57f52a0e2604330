use std::path::PathBuf;
use std::time::Instant;

use log::info;

use crate::artifacts::ArtifactStore;
use crate::classifier::{ClassifierError, MultinomialNb, TfidfVectorizer};
use crate::config::TrainingConfig;
use crate::dataset::{Dataset, DatasetLoader};
use crate::metrics::{classification_report, ClassificationReport};

/// Outcome of the prediction made after training as a smoke test
#[derive(Debug, Clone, PartialEq)]
pub struct SanityCheck {
    pub message: String,
    pub predicted: String,
}

/// Everything a training run produced that is worth reporting
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub n_records: usize,
    pub n_dropped: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Positions of the held-out records in the loaded dataset
    pub test_indices: Vec<usize>,
    pub vocabulary_size: usize,
    pub classes: Vec<String>,
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub vectorizer_path: PathBuf,
    pub classifier_path: PathBuf,
    pub sanity: SanityCheck,
}

/// Runs load, split, fit, evaluate, persist and the sanity prediction in order.
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Loads the configured dataset and trains on it
    pub fn run(&self) -> Result<TrainingSummary, ClassifierError> {
        self.config.validate()?;
        let dataset = DatasetLoader::new()
            .with_delimiter(self.config.delimiter)
            .load(&self.config.data_path)?;
        self.run_on_dataset(&dataset)
    }

    /// Trains on an already loaded dataset
    pub fn run_on_dataset(&self, dataset: &Dataset) -> Result<TrainingSummary, ClassifierError> {
        let config = &self.config;
        config.validate()?;
        let start_time = Instant::now();

        let split = dataset.train_test_split(config.test_size, config.random_state)?;
        info!(
            "Split {} records into {} train / {} test (seed {})",
            dataset.len(),
            split.train.len(),
            split.test.len(),
            config.random_state
        );

        let (min_n, max_n) = config.ngram_range;
        let (vectorizer, train_rows) = TfidfVectorizer::builder()
            .with_ngram_range(min_n, max_n)
            .with_max_features(config.max_features)
            .with_norm(config.norm)
            .fit_transform(&split.train_messages())?;
        let test_rows = vectorizer.transform(&split.test_messages())?;

        let model = MultinomialNb::builder()
            .with_alpha(config.alpha)
            .fit(&train_rows, &split.train_responses())?;
        info!("Training finished in {:.2?}", start_time.elapsed());

        let predictions = model.predict_batch(&test_rows)?;
        let report = classification_report(&split.test_responses(), &predictions)?;
        info!("Evaluation accuracy: {:.4}", report.accuracy);

        let store = ArtifactStore::with_names(&config.output_dir, config.artifact_names.clone())?;
        let vectorizer_path = store.save_vectorizer(&vectorizer)?;
        let classifier_path = store.save_classifier(&model)?;

        // Empty text is accepted here and falls back to the class priors
        let predicted = model.predict(&vectorizer.transform_one(&config.sanity_message)?)?;
        info!("Sanity check: {:?} -> {:?}", config.sanity_message, predicted);

        Ok(TrainingSummary {
            n_records: dataset.len(),
            n_dropped: dataset.dropped(),
            n_train: split.train.len(),
            n_test: split.test.len(),
            test_indices: split.test_indices,
            vocabulary_size: vectorizer.vocabulary_size(),
            classes: model.classes().to_vec(),
            accuracy: report.accuracy,
            report,
            vectorizer_path,
            classifier_path,
            sanity: SanityCheck {
                message: config.sanity_message.clone(),
                predicted,
            },
        })
    }
}
