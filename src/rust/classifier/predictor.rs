use std::collections::HashMap;
use std::sync::Arc;

use super::error::ClassifierError;
use super::naive_bayes::MultinomialNb;
use super::vectorizer::TfidfVectorizer;
use super::PredictorInfo;

/// Pairs a fitted vectorizer with the classifier trained on its output and
/// answers free-text messages with a predicted response.
///
/// Both halves are shared behind `Arc`, so the predictor is cheap to clone and
/// `Send + Sync`.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use chat_responder::{MultinomialNb, ResponsePredictor, TfidfVectorizer};
///
/// let messages = ["hi", "hi", "bye"];
/// let responses = ["hello!", "hello!", "goodbye!"];
/// let (vectorizer, rows) = TfidfVectorizer::builder().fit_transform(&messages)?;
/// let model = MultinomialNb::builder().fit(&rows, &responses)?;
///
/// let predictor = ResponsePredictor::new(vectorizer, model)?;
/// let (response, scores) = predictor.predict("hi")?;
/// assert_eq!(response, "hello!");
/// assert!(scores["hello!"] > scores["goodbye!"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResponsePredictor {
    vectorizer: Arc<TfidfVectorizer>,
    model: Arc<MultinomialNb>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ResponsePredictor>();
    }
};

impl ResponsePredictor {
    /// Fails with `DimensionMismatch` when the model was not trained on this
    /// vectorizer's feature space
    pub fn new(vectorizer: TfidfVectorizer, model: MultinomialNb) -> Result<Self, ClassifierError> {
        if vectorizer.vocabulary_size() != model.n_features() {
            return Err(ClassifierError::DimensionMismatch {
                expected: model.n_features(),
                actual: vectorizer.vocabulary_size(),
            });
        }
        Ok(Self {
            vectorizer: Arc::new(vectorizer),
            model: Arc::new(model),
        })
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &MultinomialNb {
        &self.model
    }

    pub fn info(&self) -> PredictorInfo {
        PredictorInfo {
            num_classes: self.model.classes().len(),
            class_labels: self.model.classes().to_vec(),
            vocabulary_size: self.vectorizer.vocabulary_size(),
            ngram_range: self.vectorizer.ngram_range(),
            alpha: self.model.alpha(),
        }
    }

    /// Predicts a response for `text` along with the posterior of every class
    pub fn predict(&self, text: &str) -> Result<(String, HashMap<String, f64>), ClassifierError> {
        if text.is_empty() {
            return Err(ClassifierError::Validation("Input text cannot be empty".into()));
        }

        let row = self.vectorizer.transform_one(text)?;
        let label = self.model.predict(&row)?;
        let scores = self.model.predict_proba(&row)?;
        Ok((label, scores))
    }

    /// Predicts one response per text without computing probabilities
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>, ClassifierError> {
        let rows = self.vectorizer.transform(texts)?;
        self.model.predict_batch(&rows)
    }
}
