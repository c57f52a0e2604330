use std::io;

/// Represents the different types of errors that can occur while training,
/// evaluating, persisting or using the response classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The dataset or an artifact could not be read or written
    #[error("Data access error: {0}")]
    DataAccess(String),
    /// The dataset header lacks a required column
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    /// Invalid input parameters or training data
    #[error("Validation error: {0}")]
    Validation(String),
    /// A feature vector does not live in the fitted feature space
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Encoding or decoding an artifact failed
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The file is not an artifact written by this crate
    #[error("Format mismatch: {0}")]
    FormatMismatch(String),
    #[error("Unsupported artifact version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },
    #[error("Artifact kind mismatch: expected {expected}, found {found}")]
    ArtifactKindMismatch { expected: String, found: String },
    #[error("Checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
}

impl From<io::Error> for ClassifierError {
    fn from(err: io::Error) -> Self {
        ClassifierError::DataAccess(err.to_string())
    }
}

impl From<csv::Error> for ClassifierError {
    fn from(err: csv::Error) -> Self {
        ClassifierError::DataAccess(err.to_string())
    }
}

impl From<bincode::Error> for ClassifierError {
    fn from(err: bincode::Error) -> Self {
        ClassifierError::Serialization(err.to_string())
    }
}
