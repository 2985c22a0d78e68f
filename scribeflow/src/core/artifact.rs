//! Stage artifact type for capturing validated outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single field value inside a record payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A scalar text value.
    Text(String),
    /// An ordered list of scalar text values.
    TextList(Vec<String>),
}

impl FieldValue {
    /// Returns the scalar text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::TextList(_) => None,
        }
    }

    /// Returns the list items, if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::TextList(items) => Some(items),
        }
    }
}

/// The typed payload of a stage artifact.
///
/// A payload is either plain text or a record of named fields, matching
/// the stage's declared output schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactPayload {
    /// A text-shaped payload.
    Text(String),
    /// A record of named typed fields.
    Record(HashMap<String, FieldValue>),
}

impl ArtifactPayload {
    /// Returns the payload text, if text-shaped.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Record(_) => None,
        }
    }

    /// Returns a record field by name, if record-shaped.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        match self {
            Self::Text(_) => None,
            Self::Record(fields) => fields.get(name),
        }
    }
}

/// An artifact produced by a stage.
///
/// Artifacts are immutable once produced. Ownership transfers to later
/// stages by value (via shared references to the frozen artifact), never
/// by mutable reference, so the final output preserves full provenance.
/// The original raw model text is always kept alongside the parsed
/// payload for debuggability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageArtifact {
    /// The name of the stage that produced this artifact.
    pub stage: String,
    /// The schema-validated payload.
    pub payload: ArtifactPayload,
    /// The raw model text the payload was parsed from.
    pub raw: String,
    /// When the artifact was produced.
    pub created_at: DateTime<Utc>,
}

impl StageArtifact {
    /// Creates a new artifact stamped with the current time.
    #[must_use]
    pub fn new(stage: impl Into<String>, payload: ArtifactPayload, raw: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            payload,
            raw: raw.into(),
            created_at: Utc::now(),
        }
    }

    /// Returns the payload text, if text-shaped.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.payload.text()
    }

    /// Returns a record field by name, if record-shaped.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.payload.field(name)
    }

    /// Deserializes the payload into a concrete type.
    ///
    /// Record payloads serialize as plain JSON objects, so any struct
    /// whose fields are strings or string lists can be extracted.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload does not match `T`.
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(&self.payload)?)
    }
}
