//! Model snapshots through a temporary on-disk container.
//!
//! A trained model is captured as an opaque byte blob by writing it to a
//! temporary file in a binary container format and reading the raw bytes back;
//! restoring reverses the trip. The [`Pickled`] wrapper plugs the same
//! capture/restore pair into any serde envelope, so a model can ride inside a
//! larger serialized object without the model type itself knowing about it.
//! Temporary files are removed when the call returns.

use std::io::Write;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("container error: {0}")]
    Container(#[from] bincode::Error),
}

/// Opaque captured model state (architecture + weights).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedModel {
    pub bytes: Vec<u8>,
}

/// Capture a model into an opaque byte blob.
pub fn capture<M: Serialize>(model: &M) -> Result<SerializedModel, SnapshotError> {
    let mut file = NamedTempFile::new()?;
    bincode::serialize_into(file.as_file_mut(), model)?;
    file.as_file_mut().flush()?;
    let bytes = std::fs::read(file.path())?;
    debug!(len = bytes.len(), "captured model snapshot");
    Ok(SerializedModel { bytes })
}

/// Restore a model from a blob produced by [`capture`].
pub fn restore<M: DeserializeOwned>(blob: &SerializedModel) -> Result<M, SnapshotError> {
    let mut file = NamedTempFile::new()?;
    file.as_file_mut().write_all(&blob.bytes)?;
    file.as_file_mut().flush()?;
    let reader = std::io::BufReader::new(std::fs::File::open(file.path())?);
    Ok(bincode::deserialize_from(reader)?)
}

/// Adapter that serializes a model through [`capture`]/[`restore`].
///
/// Wrapping replaces the model's own serde shape with the opaque blob, which
/// keeps envelopes stable across model-layout changes.
#[derive(Debug, Clone)]
pub struct Pickled<M>(pub M);

impl<M: Serialize> Serialize for Pickled<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let blob = capture(&self.0).map_err(serde::ser::Error::custom)?;
        serializer.serialize_bytes(&blob.bytes)
    }
}

impl<'de, M: DeserializeOwned> Deserialize<'de> for Pickled<M> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        let model = restore(&SerializedModel { bytes }).map_err(serde::de::Error::custom)?;
        Ok(Pickled(model))
    }
}
