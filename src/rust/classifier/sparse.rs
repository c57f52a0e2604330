use ndarray::Array1;

use super::error::ClassifierError;

/// A sparse row in a fitted feature space.
///
/// Entries are kept sorted by feature index with no duplicates and no explicit
/// zeros. `dim` is the size of the feature space the row belongs to, which is
/// what the classifier checks against its own fitted feature count.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// An all-zero vector of the given dimensionality
    pub fn zeros(dim: usize) -> Self {
        Self { dim, entries: Vec::new() }
    }

    /// Builds a vector from `(index, value)` pairs.
    ///
    /// Pairs may come in any order; repeated indices are summed and zeros
    /// dropped. Fails if an index falls outside `0..dim`.
    pub fn from_entries(
        dim: usize,
        mut entries: Vec<(usize, f64)>,
    ) -> Result<Self, ClassifierError> {
        if let Some(&(index, _)) = entries.iter().find(|(i, _)| *i >= dim) {
            return Err(ClassifierError::DimensionMismatch {
                expected: dim,
                actual: index + 1,
            });
        }
        entries.sort_by_key(|(i, _)| *i);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (index, value) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == index => *acc += value,
                _ => merged.push((index, value)),
            }
        }
        merged.retain(|(_, v)| *v != 0.0);

        Ok(Self { dim, entries: merged })
    }

    /// Size of the feature space this vector lives in
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Non-zero entries in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Value at `index`, zero when not stored
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn to_dense(&self) -> Array1<f64> {
        let mut dense = Array1::zeros(self.dim);
        for (index, value) in self.iter() {
            dense[index] = value;
        }
        dense
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut f64> + '_ {
        self.entries.iter_mut().map(|(_, v)| v)
    }
}
