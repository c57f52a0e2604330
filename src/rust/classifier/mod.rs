mod error;
mod naive_bayes;
mod predictor;
mod sparse;
mod tokenize;
mod utils;
pub mod vectorizer;

pub use error::ClassifierError;
pub use naive_bayes::{MultinomialNb, MultinomialNbBuilder};
pub use predictor::ResponsePredictor;
pub use sparse::FeatureVector;
pub use tokenize::Analyzer;
pub use vectorizer::{Norm, TfidfVectorizer, TfidfVectorizerBuilder};

/// Information about a fitted vectorizer/classifier pair
#[derive(Debug, Clone)]
pub struct PredictorInfo {
    /// Number of responses the classifier can produce
    pub num_classes: usize,
    /// Labels of the classes, in ascending order
    pub class_labels: Vec<String>,
    /// Dimensionality of the feature space
    pub vocabulary_size: usize,
    /// Inclusive n-gram range used by the vectorizer
    pub ngram_range: (usize, usize),
    /// Additive smoothing constant the classifier was fitted with
    pub alpha: f64,
}
