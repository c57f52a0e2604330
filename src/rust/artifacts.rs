use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classifier::{ClassifierError, MultinomialNb, ResponsePredictor, TfidfVectorizer};

/// Identifier written into every artifact envelope
pub const FORMAT_ID: &str = "chat-responder";
/// Version of the envelope and payload layout
pub const FORMAT_VERSION: u32 = 1;

/// What an artifact file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Vectorizer,
    Classifier,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vectorizer => write!(f, "vectorizer"),
            Self::Classifier => write!(f, "classifier"),
        }
    }
}

/// File names of the two artifacts inside an artifact directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub vectorizer: String,
    pub classifier: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            vectorizer: "vectorizer.bin".to_string(),
            classifier: "chatbot_model.bin".to_string(),
        }
    }
}

/// On-disk wrapper around an encoded payload
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    format: String,
    version: u32,
    kind: ArtifactKind,
    sha256: String,
    payload: Vec<u8>,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Reads and writes the fitted vectorizer and classifier in one directory.
///
/// Each artifact is a `bincode` envelope carrying the format identifier,
/// version, artifact kind and the SHA-256 digest of the payload; loading checks
/// all four before decoding the payload.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    names: ArtifactNames,
}

impl ArtifactStore {
    /// Opens (and creates if needed) an artifact directory with the default file names
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, ClassifierError> {
        Self::with_names(dir, ArtifactNames::default())
    }

    pub fn with_names<P: AsRef<Path>>(dir: P, names: ArtifactNames) -> Result<Self, ClassifierError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            ClassifierError::DataAccess(format!("Cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir, names })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        match kind {
            ArtifactKind::Vectorizer => self.dir.join(&self.names.vectorizer),
            ArtifactKind::Classifier => self.dir.join(&self.names.classifier),
        }
    }

    pub fn artifacts_exist(&self) -> bool {
        let vectorizer_path = self.path_for(ArtifactKind::Vectorizer);
        let classifier_path = self.path_for(ArtifactKind::Classifier);
        debug!("Checking for artifacts:");
        debug!("  Vectorizer path: {:?} (exists: {})", vectorizer_path, vectorizer_path.exists());
        debug!("  Classifier path: {:?} (exists: {})", classifier_path, classifier_path.exists());
        vectorizer_path.exists() && classifier_path.exists()
    }

    pub fn save_vectorizer(&self, vectorizer: &TfidfVectorizer) -> Result<PathBuf, ClassifierError> {
        self.save(ArtifactKind::Vectorizer, vectorizer)
    }

    pub fn save_classifier(&self, model: &MultinomialNb) -> Result<PathBuf, ClassifierError> {
        self.save(ArtifactKind::Classifier, model)
    }

    pub fn load_vectorizer(&self) -> Result<TfidfVectorizer, ClassifierError> {
        let vectorizer: TfidfVectorizer = self.load(ArtifactKind::Vectorizer)?;
        vectorizer.validate_state()?;
        Ok(vectorizer)
    }

    pub fn load_classifier(&self) -> Result<MultinomialNb, ClassifierError> {
        let model: MultinomialNb = self.load(ArtifactKind::Classifier)?;
        model.validate_state()?;
        Ok(model)
    }

    /// Loads both artifacts and pairs them into a predictor
    pub fn load_predictor(&self) -> Result<ResponsePredictor, ClassifierError> {
        ResponsePredictor::new(self.load_vectorizer()?, self.load_classifier()?)
    }

    /// Checks the envelope and digest of both artifacts without decoding the
    /// payloads. Returns `Ok(false)` when either file is missing.
    pub fn verify(&self) -> Result<bool, ClassifierError> {
        if !self.artifacts_exist() {
            info!("One or both artifacts do not exist");
            return Ok(false);
        }
        let vectorizer_ok = self.read_envelope(ArtifactKind::Vectorizer).is_ok();
        let classifier_ok = self.read_envelope(ArtifactKind::Classifier).is_ok();

        info!("Verification results:");
        info!("  Vectorizer: {}", vectorizer_ok);
        info!("  Classifier: {}", classifier_ok);
        Ok(vectorizer_ok && classifier_ok)
    }

    fn save<T: Serialize>(&self, kind: ArtifactKind, value: &T) -> Result<PathBuf, ClassifierError> {
        let path = self.path_for(kind);
        let payload = bincode::serialize(value)?;
        let envelope = Envelope {
            format: FORMAT_ID.to_string(),
            version: FORMAT_VERSION,
            kind,
            sha256: sha256_hex(&payload),
            payload,
        };
        let bytes = bincode::serialize(&envelope)?;

        info!("Writing {} ({} bytes) to {:?}", kind, bytes.len(), path);
        fs::write(&path, bytes).map_err(|e| {
            ClassifierError::DataAccess(format!("Cannot write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }

    fn read_envelope(&self, kind: ArtifactKind) -> Result<Envelope, ClassifierError> {
        let path = self.path_for(kind);
        let bytes = fs::read(&path).map_err(|e| {
            ClassifierError::DataAccess(format!("Cannot read {}: {}", path.display(), e))
        })?;
        debug!("Read {} bytes from {:?}", bytes.len(), path);

        let envelope: Envelope = bincode::deserialize(&bytes).map_err(|_| {
            ClassifierError::FormatMismatch(format!(
                "{} is not a {} artifact",
                path.display(),
                FORMAT_ID
            ))
        })?;

        if envelope.format != FORMAT_ID {
            return Err(ClassifierError::FormatMismatch(format!(
                "{} has format '{}', expected '{}'",
                path.display(),
                envelope.format,
                FORMAT_ID
            )));
        }
        if envelope.version != FORMAT_VERSION {
            return Err(ClassifierError::UnsupportedVersion {
                expected: FORMAT_VERSION,
                found: envelope.version,
            });
        }
        if envelope.kind != kind {
            return Err(ClassifierError::ArtifactKindMismatch {
                expected: kind.to_string(),
                found: envelope.kind.to_string(),
            });
        }

        let actual = sha256_hex(&envelope.payload);
        if actual != envelope.sha256 {
            error!("{} checksum mismatch: expected {}, got {}", kind, envelope.sha256, actual);
            return Err(ClassifierError::ChecksumMismatch {
                artifact: kind.to_string(),
                expected: envelope.sha256,
                actual,
            });
        }
        Ok(envelope)
    }

    fn load<T: DeserializeOwned>(&self, kind: ArtifactKind) -> Result<T, ClassifierError> {
        let envelope = self.read_envelope(kind)?;
        let value = bincode::deserialize(&envelope.payload)?;
        info!("Loaded {} from {:?}", kind, self.path_for(kind));
        Ok(value)
    }
}
