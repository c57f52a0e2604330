//! Loading (message, response) pairs and splitting them for training.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::classifier::ClassifierError;

pub const MESSAGE_COLUMN: &str = "message";
pub const RESPONSE_COLUMN: &str = "response";

/// One training example: a user message and the response it should trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub message: String,
    pub response: String,
}

impl Record {
    pub fn new(message: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: response.into(),
        }
    }
}

/// An ordered collection of complete records.
///
/// Every record has a non-empty message and response; incomplete rows are
/// counted in [`dropped`](Self::dropped) instead of being stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    dropped: usize,
}

impl Dataset {
    /// Builds a dataset from records, discarding the incomplete ones
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut dataset = Dataset::default();
        for record in records {
            if record.message.is_empty() || record.response.is_empty() {
                dataset.dropped += 1;
            } else {
                dataset.records.push(record);
            }
        }
        dataset
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows discarded while loading because a field was missing or unreadable
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn messages(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.message.as_str()).collect()
    }

    pub fn responses(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.response.as_str()).collect()
    }

    /// Partitions the records into a shuffled train and test subset.
    ///
    /// The permutation is drawn from a `StdRng` seeded with `seed`, so the same
    /// dataset and seed always give the same split. The first
    /// `ceil(len * test_size)` shuffled records form the test subset and the
    /// rest the training subset. Labels are not stratified.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<Split, ClassifierError> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(ClassifierError::Validation(format!(
                "test_size must be between 0 and 1 (exclusive), got {}",
                test_size
            )));
        }

        let n = self.records.len();
        let n_test = (n as f64 * test_size).ceil() as usize;
        let n_train = n.saturating_sub(n_test);
        if n_test == 0 || n_train == 0 {
            return Err(ClassifierError::Validation(format!(
                "With {} records and test_size {} the train or test subset would be empty",
                n, test_size
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let pick = |idx: &[usize]| -> Vec<Record> {
            idx.iter().map(|&i| self.records[i].clone()).collect()
        };
        Ok(Split {
            test_indices: indices[..n_test].to_vec(),
            train_indices: indices[n_test..].to_vec(),
            test: pick(&indices[..n_test]),
            train: pick(&indices[n_test..]),
        })
    }
}

/// A disjoint train/test partition of a [`Dataset`]
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<Record>,
    pub test: Vec<Record>,
    /// Positions of the training records in the source dataset
    pub train_indices: Vec<usize>,
    /// Positions of the test records in the source dataset
    pub test_indices: Vec<usize>,
}

impl Split {
    pub fn train_messages(&self) -> Vec<&str> {
        self.train.iter().map(|r| r.message.as_str()).collect()
    }

    pub fn train_responses(&self) -> Vec<&str> {
        self.train.iter().map(|r| r.response.as_str()).collect()
    }

    pub fn test_messages(&self) -> Vec<&str> {
        self.test.iter().map(|r| r.message.as_str()).collect()
    }

    pub fn test_responses(&self) -> Vec<&str> {
        self.test.iter().map(|r| r.response.as_str()).collect()
    }
}

/// Reads a delimited table with `message` and `response` columns.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    delimiter: u8,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    /// Create a loader for comma separated input
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Loads the file at `path`.
    ///
    /// Fails if the file cannot be opened or read, or if the header lacks one
    /// of the required columns. Rows with a missing or empty field, and rows
    /// that cannot be decoded, are dropped.
    ///
    /// Only absent or empty fields count as missing. Placeholder text such as
    /// `NA`, `N/A`, `null`, `NaN` or `None` is kept as an ordinary message or
    /// response, unlike loaders that map those tokens to a missing value.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset, ClassifierError> {
        let path = path.as_ref();
        info!("Loading dataset from {:?}", path);
        let file = File::open(path).map_err(|e| {
            ClassifierError::DataAccess(format!("Cannot open {}: {}", path.display(), e))
        })?;
        let dataset = self.load_from_reader(file)?;
        info!(
            "Loaded {} records ({} dropped) from {:?}",
            dataset.len(),
            dataset.dropped(),
            path
        );
        Ok(dataset)
    }

    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Dataset, ClassifierError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ClassifierError::MissingColumn(name.to_string()))
        };
        let message_idx = column(MESSAGE_COLUMN)?;
        let response_idx = column(RESPONSE_COLUMN)?;

        let mut dataset = Dataset::default();
        for (row, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    warn!("Dropping malformed row {}: {}", row + 1, e);
                    dataset.dropped += 1;
                    continue;
                }
            };

            match (record.get(message_idx), record.get(response_idx)) {
                (Some(message), Some(response)) if !message.is_empty() && !response.is_empty() => {
                    dataset.records.push(Record::new(message, response));
                }
                _ => dataset.dropped += 1,
            }
        }

        if dataset.dropped > 0 {
            info!("Dropped {} rows with missing fields", dataset.dropped);
        }
        Ok(dataset)
    }
}
