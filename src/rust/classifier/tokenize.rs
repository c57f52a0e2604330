use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Words of two or more Unicode word characters
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").expect("token pattern is valid");
}

/// Turns raw text into the word n-grams the vectorizer counts.
///
/// Text is lowercased, split into words of at least two word characters, and
/// expanded into every n-gram for `n` in `min_n..=max_n`. All n-grams of one
/// size are emitted before the next size; tokens inside an n-gram are joined by
/// a single space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    min_n: usize,
    max_n: usize,
}

impl Analyzer {
    pub fn new(min_n: usize, max_n: usize) -> Self {
        Self { min_n, max_n }
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        (self.min_n, self.max_n)
    }

    /// Lowercased word tokens, in order of appearance
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self.tokens(text);
        let mut ngrams = Vec::new();
        let upper = self.max_n.min(tokens.len());
        for n in self.min_n.max(1)..=upper {
            for window in tokens.windows(n) {
                ngrams.push(window.join(" "));
            }
        }
        ngrams
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(1, 2)
    }
}
