//! Trained model artifacts and their on-disk format.
//!
//! ```text
//! +-------+-----------+---------------+------------------+-----------+
//! | TRGM  | version   | payload len   | bincode payload  | crc32     |
//! | 4 B   | u16 LE    | u64 LE        | len bytes        | u32 LE    |
//! +-------+-----------+---------------+------------------+-----------+
//! ```

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::pipeline::{LabelVector, Pipeline};
use crate::search::grid::ModelConfig;

/// File magic of a model artifact.
pub const MAGIC: &[u8; 4] = b"TRGM";

/// Current artifact format version.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 8;
const CHECKSUM_LEN: usize = 4;

/// Provenance of a trained artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Version of the crate that trained the model.
    pub version: String,
    pub trained_at: DateTime<Utc>,
    /// Number of messages the final model was fitted on.
    pub training_examples: usize,
    pub config: ModelConfig,
    /// Mean cross-validated score of `config`.
    pub cv_score: f64,
    pub retained_categories: Vec<String>,
    pub excluded_categories: Vec<String>,
}

/// A fitted pipeline together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pipeline: Pipeline,
    metadata: ArtifactMetadata,
}

impl ModelArtifact {
    pub fn new(pipeline: Pipeline, metadata: ArtifactMetadata) -> Result<Self> {
        if !pipeline.is_fitted() {
            return Err(TriageError::model("cannot package an unfitted pipeline"));
        }
        Ok(ModelArtifact { pipeline, metadata })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    /// Categories in prediction order.
    pub fn categories(&self) -> &[String] {
        self.pipeline.categories()
    }

    pub fn predict(&self, text: &str) -> Result<LabelVector> {
        self.pipeline.predict_one(text)
    }

    pub fn predict_batch(&self, texts: &[&str]) -> Result<Vec<LabelVector>> {
        self.pipeline.predict_labels(texts)
    }

    /// Encode the artifact into its file representation.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| TriageError::serialization(format!("Failed to encode model: {e}")))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        Ok(bytes)
    }

    /// Decode an artifact, verifying magic, version, length and checksum.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(TriageError::serialization("model file is truncated"));
        }
        if &bytes[..4] != MAGIC {
            return Err(TriageError::serialization("not a model file"));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != FORMAT_VERSION {
            return Err(TriageError::serialization(format!(
                "Unsupported model format version: {version}"
            )));
        }

        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&bytes[6..HEADER_LEN]);
        let len = u64::from_le_bytes(len_bytes);
        let expected = (bytes.len() - HEADER_LEN - CHECKSUM_LEN) as u64;
        if len != expected {
            return Err(TriageError::serialization(format!(
                "payload length {len} does not match file ({expected} bytes)"
            )));
        }

        let payload = &bytes[HEADER_LEN..bytes.len() - CHECKSUM_LEN];
        let mut crc_bytes = [0u8; 4];
        crc_bytes.copy_from_slice(&bytes[bytes.len() - CHECKSUM_LEN..]);
        if crc32fast::hash(payload) != u32::from_le_bytes(crc_bytes) {
            return Err(TriageError::serialization("model checksum mismatch"));
        }

        let (artifact, _): (ModelArtifact, _) =
            bincode::serde::decode_from_slice(payload, bincode::config::standard())
                .map_err(|e| TriageError::serialization(format!("Failed to decode model: {e}")))?;
        Ok(artifact)
    }
}

/// Write `artifact` to `path`, replacing any existing file.
pub fn save<P: AsRef<Path>>(artifact: &ModelArtifact, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, artifact.to_bytes()?)?;
    log::info!("saved model to {}", path.display());
    Ok(())
}

/// Read an artifact previously written by [`save`].
pub fn load<P: AsRef<Path>>(path: P) -> Result<ModelArtifact> {
    let bytes = fs::read(path.as_ref())?;
    ModelArtifact::from_bytes(&bytes)
}
