//! Temporary links and copy references.

use super::{FileMetadata, Model, ModelFactory};
use crate::errors::{DropboxError, DropboxResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A short-lived direct download link to a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryLink {
    /// Download URL.
    pub link: String,
    /// Metadata of the linked file.
    pub metadata: FileMetadata,
    /// Fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A reference that lets another account copy a file or folder.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyReference {
    reference: String,
    expires: Option<DateTime<Utc>>,
    metadata: Option<Box<Model>>,
    data: Map<String, Value>,
}

impl CopyReference {
    /// Builds a copy reference from a decoded response.
    pub fn from_data(data: Map<String, Value>) -> DropboxResult<Self> {
        let reference = data
            .get("copy_reference")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let expires = match data.get("expires").and_then(Value::as_str) {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| DropboxError::deserialization(format!("expires: {}", e)))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        let metadata = match data.get("metadata") {
            Some(Value::Object(metadata)) => {
                Some(Box::new(ModelFactory::make(metadata.clone())?))
            }
            _ => None,
        };

        Ok(Self {
            reference,
            expires,
            metadata,
            data,
        })
    }

    /// Opaque reference string.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// When the reference stops working.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Metadata of the referenced entry.
    pub fn metadata(&self) -> Option<&Model> {
        self.metadata.as_deref()
    }

    /// The decoded response.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}
