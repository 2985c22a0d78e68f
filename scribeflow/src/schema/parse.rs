//! Coercion of raw model text into typed payloads.

use super::{FieldKind, FieldSpec};
use crate::core::{ArtifactPayload, FieldValue};
use crate::errors::StructuredParseError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

#[allow(clippy::unwrap_used)] // the pattern is a literal and always compiles
fn key_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9 _-]*?)\s*:\s*(.*)$").unwrap())
}

/// Strips a surrounding markdown code fence, if present.
///
/// Models routinely wrap structured output in ```` ```json ```` fences;
/// the fence carries no information and must not defeat parsing.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the fence's info string (e.g. "json") up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => return trimmed,
    };
    body.strip_suffix("```").map_or(body, str::trim).trim()
}

pub(super) fn parse_text(raw: &str) -> Result<ArtifactPayload, StructuredParseError> {
    let cleaned = strip_code_fence(raw);
    if cleaned.is_empty() {
        return Err(StructuredParseError::new(
            "text",
            "is required but the response was empty",
            raw,
        ));
    }
    Ok(ArtifactPayload::Text(cleaned.to_string()))
}

pub(super) fn parse_record(
    raw: &str,
    fields: &[FieldSpec],
) -> Result<ArtifactPayload, StructuredParseError> {
    let cleaned = strip_code_fence(raw);

    let candidates = match serde_json::from_str::<serde_json::Value>(cleaned) {
        Ok(serde_json::Value::Object(map)) => json_candidates(map),
        _ => line_candidates(cleaned),
    };

    let mut record = HashMap::new();
    for spec in fields {
        let key = normalize_key(&spec.name);
        match candidates.get(&key) {
            Some(value) => {
                record.insert(spec.name.clone(), coerce(value, spec, raw)?);
            }
            None if spec.required => {
                return Err(StructuredParseError::new(
                    &spec.name,
                    "is required but missing from the response",
                    raw,
                ));
            }
            None => {}
        }
    }

    Ok(ArtifactPayload::Record(record))
}

/// An intermediate value pulled from the response before kind checking.
#[derive(Debug)]
enum Candidate {
    Text(String),
    List(Vec<String>),
    Other(&'static str),
}

fn json_candidates(map: serde_json::Map<String, serde_json::Value>) -> HashMap<String, Candidate> {
    map.into_iter()
        .map(|(key, value)| (normalize_key(&key), json_candidate(value)))
        .collect()
}

fn json_candidate(value: serde_json::Value) -> Candidate {
    match value {
        serde_json::Value::String(text) => Candidate::Text(text),
        serde_json::Value::Number(number) => Candidate::Text(number.to_string()),
        serde_json::Value::Bool(flag) => Candidate::Text(flag.to_string()),
        serde_json::Value::Array(items) => {
            let mut texts = Vec::with_capacity(items.len());
            for item in items {
                match json_candidate(item) {
                    Candidate::Text(text) => texts.push(text),
                    Candidate::List(_) | Candidate::Other(_) => {
                        return Candidate::Other("a list with non-scalar items")
                    }
                }
            }
            Candidate::List(texts)
        }
        serde_json::Value::Null => Candidate::Other("null"),
        serde_json::Value::Object(_) => Candidate::Other("a nested object"),
    }
}

/// Extracts `key: value` pairs from delimited free text.
///
/// A line that does not open a new key continues the previous value;
/// bullet lines become list items joined with commas.
fn line_candidates(cleaned: &str) -> HashMap<String, Candidate> {
    let mut values: HashMap<String, String> = HashMap::new();
    let mut current_key: Option<String> = None;

    for line in cleaned.lines() {
        if let Some(caps) = key_line_pattern().captures(line) {
            let key = normalize_key(&caps[1]);
            values.insert(key.clone(), unquote(caps[2].trim()).to_string());
            current_key = Some(key);
            continue;
        }

        let Some(current) = &current_key else { continue };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(entry) = values.get_mut(current) {
            let item = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
                .map(str::trim);
            match item {
                Some(item) if entry.is_empty() => entry.push_str(item),
                Some(item) => {
                    entry.push_str(", ");
                    entry.push_str(item);
                }
                None => {
                    if !entry.is_empty() {
                        entry.push(' ');
                    }
                    entry.push_str(trimmed);
                }
            }
        }
    }

    values
        .into_iter()
        .map(|(key, value)| (key, Candidate::Text(value)))
        .collect()
}

fn coerce(
    candidate: &Candidate,
    spec: &FieldSpec,
    raw: &str,
) -> Result<FieldValue, StructuredParseError> {
    match (spec.kind, candidate) {
        (FieldKind::Text, Candidate::Text(text)) => Ok(FieldValue::Text(text.clone())),
        (FieldKind::Text, Candidate::List(_)) => Err(StructuredParseError::new(
            &spec.name,
            "expected a text value but found a list",
            raw,
        )),
        (FieldKind::TextList, Candidate::List(items)) => Ok(FieldValue::TextList(items.clone())),
        // Delimited responses carry lists as comma-separated text.
        (FieldKind::TextList, Candidate::Text(text)) => Ok(FieldValue::TextList(
            text.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(ToString::to_string)
                .collect(),
        )),
        (_, Candidate::Other(found)) => Err(StructuredParseError::new(
            &spec.name,
            format!("has an unsupported value kind ({found})"),
            raw,
        )),
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace([' ', '-'], "_")
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
