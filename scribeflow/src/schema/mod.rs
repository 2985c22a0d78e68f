//! Output schemas and the structured result parser.
//!
//! Generative output is not a grammar. The parser is the boundary that
//! turns unchecked free text into a verified typed payload, and it is
//! deliberately defensive: tolerant of whitespace, field ordering, code
//! fences and unknown fields; loud on every missing required field.

mod parse;

use crate::core::ArtifactPayload;
use crate::errors::StructuredParseError;
use serde::{Deserialize, Serialize};

/// The kind of value a record field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A scalar text value.
    Text,
    /// An ordered list of scalar text values.
    TextList,
}

/// Declaration of a single field in a record schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// The field name, matched case-insensitively against the response.
    pub name: String,
    /// The kind of value the field holds.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
}

impl FieldSpec {
    /// Declares a required text field.
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            required: true,
        }
    }

    /// Declares a required list-of-text field.
    #[must_use]
    pub fn text_list(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::TextList,
            required: true,
        }
    }

    /// Marks the field as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// The declared shape of a stage's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSchema {
    /// The whole response is the payload.
    Text,
    /// The response must carry the declared named fields.
    Record(Vec<FieldSpec>),
}

impl OutputSchema {
    /// Declares a record schema from field specs.
    #[must_use]
    pub fn record(fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        Self::Record(fields.into_iter().collect())
    }

    /// Parses a raw model response against this schema.
    ///
    /// Record responses may be a JSON object or line-delimited
    /// `field: value` text; surrounding code fences are stripped first.
    /// Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StructuredParseError`] naming the first required field
    /// that is missing or wrongly kinded. A partially-populated payload
    /// is never returned.
    pub fn parse(&self, raw: &str) -> Result<ArtifactPayload, StructuredParseError> {
        match self {
            Self::Text => parse::parse_text(raw),
            Self::Record(fields) => parse::parse_record(raw, fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldValue;

    #[test]
    fn test_text_schema_takes_whole_response() {
        let payload = OutputSchema::Text.parse("  A story.\n").unwrap();
        assert_eq!(payload.text(), Some("A story."));
    }

    #[test]
    fn test_text_schema_rejects_empty_response() {
        let err = OutputSchema::Text.parse("   \n  ").unwrap_err();
        assert_eq!(err.field, "text");
    }

    #[test]
    fn test_record_schema_from_json() {
        let schema = OutputSchema::record([
            FieldSpec::text("verdict"),
            FieldSpec::text_list("issues"),
        ]);

        let payload = schema
            .parse(r#"{"verdict": "revise", "issues": ["pacing", "tone"], "extra": 3}"#)
            .unwrap();

        assert_eq!(
            payload.field("verdict").and_then(FieldValue::as_text),
            Some("revise")
        );
        assert_eq!(
            payload.field("issues").and_then(FieldValue::as_list),
            Some(&["pacing".to_string(), "tone".to_string()][..])
        );
        assert!(payload.field("extra").is_none());
    }

    #[test]
    fn test_record_schema_missing_required_field() {
        let schema = OutputSchema::record([FieldSpec::text("verdict")]);
        let err = schema.parse(r#"{"something": "else"}"#).unwrap_err();

        assert_eq!(err.field, "verdict");
        assert!(err.snippet.contains("something"));
    }

    #[test]
    fn test_record_schema_optional_field_may_be_absent() {
        let schema = OutputSchema::record([
            FieldSpec::text("verdict"),
            FieldSpec::text_list("issues").optional(),
        ]);

        let payload = schema.parse(r#"{"verdict": "approve"}"#).unwrap();
        assert!(payload.field("issues").is_none());
    }

    #[test]
    fn test_record_schema_wrong_kind() {
        let schema = OutputSchema::record([FieldSpec::text("verdict")]);
        let err = schema.parse(r#"{"verdict": ["a", "b"]}"#).unwrap_err();

        assert_eq!(err.field, "verdict");
        assert!(err.message.contains("expected a text value"));
    }
}
