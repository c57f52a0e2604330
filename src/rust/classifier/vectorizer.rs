use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::sparse::FeatureVector;
use super::tokenize::Analyzer;
use super::utils::normalize_vector;

/// Row normalization applied after TF-IDF weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Norm {
    /// Scale every row to unit Euclidean length
    #[default]
    L2,
    /// Keep raw `tf * idf` weights
    None,
}

/// Configuration for a [`TfidfVectorizer`] that has not seen any data yet.
///
/// The builder is the only mutable stage of the vectorizer lifecycle: calling
/// [`fit`](Self::fit) consumes it and returns a fitted, immutable vectorizer.
///
/// # Example
/// ```
/// use chat_responder::TfidfVectorizer;
///
/// let vectorizer = TfidfVectorizer::builder()
///     .with_ngram_range(1, 2)
///     .with_max_features(500)
///     .fit(&["hello there", "good bye"])
///     .unwrap();
///
/// assert_eq!(vectorizer.vocabulary_size(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct TfidfVectorizerBuilder {
    min_n: usize,
    max_n: usize,
    max_features: Option<usize>,
    norm: Norm,
}

impl Default for TfidfVectorizerBuilder {
    fn default() -> Self {
        Self {
            min_n: 1,
            max_n: 2,
            max_features: None,
            norm: Norm::L2,
        }
    }
}

impl TfidfVectorizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive range of n-gram sizes to extract
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.min_n = min_n;
        self.max_n = max_n;
        self
    }

    /// Caps the vocabulary at the `max_features` most frequent terms
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_norm(mut self, norm: Norm) -> Self {
        self.norm = norm;
        self
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.min_n == 0 || self.min_n > self.max_n {
            return Err(ClassifierError::Validation(format!(
                "Invalid n-gram range ({}, {})",
                self.min_n, self.max_n
            )));
        }
        if self.max_features == Some(0) {
            return Err(ClassifierError::Validation(
                "max_features must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Learns the vocabulary and inverse document frequencies from `documents`.
    ///
    /// # Returns
    /// * `Result<TfidfVectorizer, ClassifierError>` - The fitted vectorizer, or an error if:
    ///   - The configuration is invalid
    ///   - No documents were given
    ///   - The documents produce no terms at all
    pub fn fit<S: AsRef<str>>(self, documents: &[S]) -> Result<TfidfVectorizer, ClassifierError> {
        self.validate()?;
        if documents.is_empty() {
            return Err(ClassifierError::Validation(
                "Cannot fit vectorizer on an empty document set".into(),
            ));
        }

        let analyzer = Analyzer::new(self.min_n, self.max_n);
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for term in analyzer.analyze(doc.as_ref()) {
                *counts.entry(term).or_insert(0) += 1;
            }
            for (term, count) in counts {
                *term_freq.entry(term.clone()).or_insert(0) += count;
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if term_freq.is_empty() {
            return Err(ClassifierError::Validation(
                "Empty vocabulary: documents contain no terms".into(),
            ));
        }
        debug!("Found {} distinct terms in {} documents", term_freq.len(), documents.len());

        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        if let Some(max_features) = self.max_features {
            if ranked.len() > max_features {
                ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                ranked.truncate(max_features);
            }
        }
        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n_documents = documents.len();
        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                ((1 + n_documents) as f64 / (1 + df) as f64).ln() + 1.0
            })
            .collect::<Array1<f64>>();

        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        info!(
            "Fitted TF-IDF vectorizer: {} features from {} documents",
            vocabulary.len(),
            n_documents
        );

        Ok(TfidfVectorizer {
            analyzer,
            vocabulary,
            idf,
            norm: self.norm,
            n_documents,
        })
    }

    /// Fits on `documents` and returns the fitted vectorizer together with the
    /// transformed documents
    pub fn fit_transform<S: AsRef<str>>(
        self,
        documents: &[S],
    ) -> Result<(TfidfVectorizer, Vec<FeatureVector>), ClassifierError> {
        let vectorizer = self.fit(documents)?;
        let rows = vectorizer.transform(documents)?;
        Ok((vectorizer, rows))
    }
}

/// A fitted TF-IDF vectorizer over word unigrams and bigrams.
///
/// Holds the learned vocabulary (term to feature index, indices in ascending
/// term order) and one smoothed inverse document frequency per feature. It has
/// no mutating methods; every text is mapped into the same feature space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    vocabulary: BTreeMap<String, usize>,
    idf: Array1<f64>,
    norm: Norm,
    n_documents: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<TfidfVectorizer>();
    }
};

impl TfidfVectorizer {
    /// Creates a new TfidfVectorizerBuilder for fluent construction
    pub fn builder() -> TfidfVectorizerBuilder {
        TfidfVectorizerBuilder::new()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// Dimensionality of every vector this vectorizer produces
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self) -> &Array1<f64> {
        &self.idf
    }

    pub fn norm(&self) -> Norm {
        self.norm
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        self.analyzer.ngram_range()
    }

    /// Number of documents the vectorizer was fitted on
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Terms ordered by feature index
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names = vec![""; self.vocabulary.len()];
        for (term, &index) in &self.vocabulary {
            names[index] = term.as_str();
        }
        names
    }

    /// Maps a single text into the fitted feature space.
    ///
    /// Terms outside the vocabulary are ignored, so any text (including an
    /// empty one) yields a vector of [`vocabulary_size`](Self::vocabulary_size)
    /// dimensions.
    pub fn transform_one(&self, text: &str) -> Result<FeatureVector, ClassifierError> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.analyzer.analyze(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        let mut row = FeatureVector::from_entries(self.vocabulary_size(), entries)?;
        if self.norm == Norm::L2 {
            normalize_vector(&mut row);
        }
        Ok(row)
    }

    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<FeatureVector>, ClassifierError> {
        texts.iter().map(|text| self.transform_one(text.as_ref())).collect()
    }

    /// Checks that a deserialized state is internally consistent
    pub(crate) fn validate_state(&self) -> Result<(), ClassifierError> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.vocabulary.len(),
                actual: self.idf.len(),
            });
        }
        let mut seen = vec![false; self.vocabulary.len()];
        for (term, &index) in &self.vocabulary {
            if index >= seen.len() || std::mem::replace(&mut seen[index], true) {
                return Err(ClassifierError::Validation(format!(
                    "Vocabulary index {} for term '{}' is out of range or duplicated",
                    index, term
                )));
            }
        }
        Ok(())
    }
}
