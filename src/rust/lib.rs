//! Offline training for a chat response classifier: TF-IDF features over word
//! unigrams and bigrams, a multinomial naive Bayes model, a held-out
//! evaluation, and persisted artifacts for later prediction.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use chat_responder::{MultinomialNb, TfidfVectorizer};
//!
//! let messages = ["hi", "hi", "bye"];
//! let responses = ["hello!", "hello!", "goodbye!"];
//!
//! let (vectorizer, rows) = TfidfVectorizer::builder()
//!     .with_ngram_range(1, 2)
//!     .with_max_features(500)
//!     .fit_transform(&messages)?;
//! let model = MultinomialNb::builder().with_alpha(1.0).fit(&rows, &responses)?;
//!
//! let row = vectorizer.transform_one("hi")?;
//! println!("Predicted response: {}", model.predict(&row)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Training Runs
//!
//! [`TrainingPipeline`] runs the whole procedure from a CSV file with
//! `message` and `response` columns, and [`ArtifactStore`] reloads what it
//! wrote:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use chat_responder::{ArtifactStore, TrainingConfig, TrainingPipeline};
//!
//! let summary = TrainingPipeline::new(TrainingConfig::default()).run()?;
//! println!("Model Accuracy: {:.2}%", summary.accuracy * 100.0);
//!
//! let predictor = ArtifactStore::new(".")?.load_predictor()?;
//! let (response, _scores) = predictor.predict("Hello")?;
//! println!("Predicted Response: {}", response);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod classifier;
mod config;
pub mod dataset;
pub mod metrics;
pub mod pipeline;

pub use artifacts::{ArtifactKind, ArtifactNames, ArtifactStore};
pub use classifier::{
    ClassifierError, FeatureVector, MultinomialNb, MultinomialNbBuilder, Norm, PredictorInfo,
    ResponsePredictor, TfidfVectorizer, TfidfVectorizerBuilder,
};
pub use config::TrainingConfig;
pub use dataset::{Dataset, DatasetLoader, Record, Split};
pub use metrics::{accuracy_score, classification_report, ClassificationReport};
pub use pipeline::{SanityCheck, TrainingPipeline, TrainingSummary};

pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
