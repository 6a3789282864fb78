//! JSON persistence of fitted model state
//!
//! Files are written as an envelope tagged with the model kind so a file
//! saved by one model cannot be loaded into another.

use super::{ModelError, ModelResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    kind: String,
    format_version: u32,
    state: T,
}

/// Write fitted state to `path`
pub fn save<T: Serialize>(path: &Path, kind: &str, state: &T) -> ModelResult<()> {
    let envelope = Envelope {
        kind: kind.to_string(),
        format_version: FORMAT_VERSION,
        state,
    };

    let content = serde_json::to_string_pretty(&envelope)
        .map_err(|e| ModelError::Persistence(format!("Failed to serialize model: {}", e)))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|source| ModelError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }

    std::fs::write(path, content).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(path = %path.display(), kind, "Model saved");

    Ok(())
}

/// Read fitted state from `path`, checking kind and format version
pub fn load<T: DeserializeOwned>(path: &Path, kind: &str) -> ModelResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let envelope: Envelope<T> = serde_json::from_str(&content).map_err(|e| {
        ModelError::Persistence(format!(
            "Failed to parse model file {}: {}",
            path.display(),
            e
        ))
    })?;

    if envelope.kind != kind {
        return Err(ModelError::Persistence(format!(
            "Model file {} holds a '{}' model, expected '{}'",
            path.display(),
            envelope.kind,
            kind
        )));
    }
    if envelope.format_version != FORMAT_VERSION {
        return Err(ModelError::Persistence(format!(
            "Unsupported model format version {} (expected {})",
            envelope.format_version, FORMAT_VERSION
        )));
    }

    tracing::info!(path = %path.display(), kind, "Model loaded");

    Ok(envelope.state)
}
