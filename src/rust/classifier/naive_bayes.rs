use std::collections::{BTreeMap, HashMap};

use log::info;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::sparse::FeatureVector;
use super::utils::log_sum_exp;

/// Configuration for a [`MultinomialNb`] that has not been fitted yet.
///
/// # Example
/// ```
/// use chat_responder::{MultinomialNb, TfidfVectorizer};
///
/// let texts = ["hi", "hi", "bye"];
/// let labels = ["hello!", "hello!", "goodbye!"];
///
/// let (vectorizer, rows) = TfidfVectorizer::builder().fit_transform(&texts).unwrap();
/// let model = MultinomialNb::builder().with_alpha(1.0).fit(&rows, &labels).unwrap();
///
/// let row = vectorizer.transform_one("hi").unwrap();
/// assert_eq!(model.predict(&row).unwrap(), "hello!");
/// ```
#[derive(Debug, Clone)]
pub struct MultinomialNbBuilder {
    alpha: f64,
}

impl Default for MultinomialNbBuilder {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

impl MultinomialNbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the additive smoothing constant (1.0 is Laplace smoothing)
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Estimates class priors and smoothed per-class feature likelihoods.
    ///
    /// # Returns
    /// * `Result<MultinomialNb, ClassifierError>` - The fitted model, or an error if:
    ///   - `alpha` is negative or not finite
    ///   - There are no training rows
    ///   - The number of rows and labels differ
    ///   - Rows have differing dimensionality
    ///   - Any feature value is negative
    ///   - `alpha` is zero and some class has no feature mass
    pub fn fit<L: AsRef<str>>(
        self,
        rows: &[FeatureVector],
        labels: &[L],
    ) -> Result<MultinomialNb, ClassifierError> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ClassifierError::Validation(format!(
                "Smoothing alpha must be a non-negative number, got {}",
                self.alpha
            )));
        }
        if rows.is_empty() {
            return Err(ClassifierError::Validation(
                "Cannot fit classifier on an empty training set".into(),
            ));
        }
        if rows.len() != labels.len() {
            return Err(ClassifierError::Validation(format!(
                "Got {} feature rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }

        let n_features = rows[0].dim();
        if let Some(row) = rows.iter().find(|row| row.dim() != n_features) {
            return Err(ClassifierError::DimensionMismatch {
                expected: n_features,
                actual: row.dim(),
            });
        }

        // BTreeMap gives the classes their ascending label order
        let class_index: BTreeMap<&str, usize> = labels
            .iter()
            .map(|l| (l.as_ref(), 0))
            .collect::<BTreeMap<_, _>>()
            .into_keys()
            .enumerate()
            .map(|(i, label)| (label, i))
            .collect();
        let classes: Vec<String> = class_index.keys().map(|l| l.to_string()).collect();
        let n_classes = classes.len();

        let mut class_count = Array1::<f64>::zeros(n_classes);
        let mut feature_count = Array2::<f64>::zeros((n_classes, n_features));
        for (row, label) in rows.iter().zip(labels) {
            let c = class_index[label.as_ref()];
            class_count[c] += 1.0;
            for (j, value) in row.iter() {
                if value < 0.0 {
                    return Err(ClassifierError::Validation(format!(
                        "Negative feature value {} at index {}",
                        value, j
                    )));
                }
                feature_count[[c, j]] += value;
            }
        }

        let n_samples = rows.len() as f64;
        let class_log_prior = class_count.mapv(|count| (count / n_samples).ln());

        let smoothed = feature_count.mapv(|count| count + self.alpha);
        let smoothed_totals = smoothed.sum_axis(Axis(1));
        if let Some(c) = smoothed_totals.iter().position(|&total| total <= 0.0) {
            return Err(ClassifierError::Validation(format!(
                "Class {:?} has no feature mass; use alpha > 0 or add training text for it",
                classes[c]
            )));
        }
        let mut feature_log_prob = smoothed.mapv(f64::ln);
        for (mut class_row, total) in feature_log_prob.outer_iter_mut().zip(smoothed_totals.iter()) {
            class_row -= total.ln();
        }

        info!(
            "Fitted multinomial naive Bayes: {} classes, {} features, {} samples",
            n_classes, n_features, rows.len()
        );

        Ok(MultinomialNb {
            classes,
            class_count,
            class_log_prior,
            feature_count,
            feature_log_prob,
            alpha: self.alpha,
        })
    }
}

/// A fitted multinomial naive Bayes classifier.
///
/// Classes are kept in ascending label order; when two classes score the same
/// joint log-likelihood the first of them wins. The model is immutable once
/// fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    classes: Vec<String>,
    class_count: Array1<f64>,
    class_log_prior: Array1<f64>,
    feature_count: Array2<f64>,
    feature_log_prob: Array2<f64>,
    alpha: f64,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<MultinomialNb>();
    }
};

impl MultinomialNb {
    /// Creates a new MultinomialNbBuilder for fluent construction
    pub fn builder() -> MultinomialNbBuilder {
        MultinomialNbBuilder::new()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of training samples seen per class
    pub fn class_count(&self) -> &Array1<f64> {
        &self.class_count
    }

    pub fn class_log_prior(&self) -> &Array1<f64> {
        &self.class_log_prior
    }

    /// `ln P(feature | class)`, one row per class
    pub fn feature_log_prob(&self) -> &Array2<f64> {
        &self.feature_log_prob
    }

    /// Unnormalized `ln P(class) + Σ x_j ln P(j | class)` for every class
    pub fn joint_log_likelihood(&self, row: &FeatureVector) -> Result<Array1<f64>, ClassifierError> {
        if row.dim() != self.n_features() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.n_features(),
                actual: row.dim(),
            });
        }

        let mut scores = self.class_log_prior.clone();
        for (c, score) in scores.iter_mut().enumerate() {
            for (j, value) in row.iter() {
                *score += value * self.feature_log_prob[[c, j]];
            }
        }
        Ok(scores)
    }

    /// Predicts the most likely label for a row
    pub fn predict(&self, row: &FeatureVector) -> Result<String, ClassifierError> {
        let scores = self.joint_log_likelihood(row)?;
        let mut best = 0;
        for (c, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = c;
            }
        }
        Ok(self.classes[best].clone())
    }

    pub fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<String>, ClassifierError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Posterior probability of every class for a row
    pub fn predict_proba(&self, row: &FeatureVector) -> Result<HashMap<String, f64>, ClassifierError> {
        let scores = self.joint_log_likelihood(row)?;
        let log_norm = log_sum_exp(scores.view());
        Ok(self
            .classes
            .iter()
            .zip(scores.iter())
            .map(|(label, &score)| (label.clone(), (score - log_norm).exp()))
            .collect())
    }

    /// Checks that a deserialized state is internally consistent
    pub(crate) fn validate_state(&self) -> Result<(), ClassifierError> {
        let n_classes = self.classes.len();
        if n_classes == 0 {
            return Err(ClassifierError::Validation("Classifier has no classes".into()));
        }
        for len in [
            self.class_count.len(),
            self.class_log_prior.len(),
            self.feature_log_prob.nrows(),
            self.feature_count.nrows(),
        ] {
            if len != n_classes {
                return Err(ClassifierError::DimensionMismatch {
                    expected: n_classes,
                    actual: len,
                });
            }
        }
        if self.feature_count.ncols() != self.n_features() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.n_features(),
                actual: self.feature_count.ncols(),
            });
        }
        Ok(())
    }
}
