//! Prompt template engine.
//!
//! Templates carry named `{placeholder}` slots. Rendering substitutes
//! every slot from a binding map and fails if a referenced placeholder
//! has no supplied value; unused bindings are ignored.

use crate::errors::TemplateError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Binding map from placeholder name to substitution value.
pub type PromptBindings = HashMap<String, String>;

#[allow(clippy::unwrap_used)] // the pattern is a literal and always compiles
fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_.]*)\}").unwrap())
}

/// A prompt template with named placeholders.
///
/// Immutable after construction; templates are shared read-only across
/// concurrent runs.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Creates a new template from a raw string.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Returns the raw template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Returns the placeholder names referenced by the template, in
    /// order of first appearance.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for capture in placeholder_pattern().captures_iter(&self.template) {
            if let Some(name) = capture.get(1) {
                if !seen.contains(&name.as_str()) {
                    seen.push(name.as_str());
                }
            }
        }
        seen
    }

    /// Renders the template with the supplied bindings.
    ///
    /// The output contains no remaining placeholder syntax. Bindings not
    /// referenced by the template are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingValue`] naming the first
    /// placeholder that has no supplied binding.
    pub fn render(&self, bindings: &PromptBindings) -> Result<String, TemplateError> {
        for name in self.placeholders() {
            if !bindings.contains_key(name) {
                return Err(TemplateError::missing_value(name));
            }
        }

        let rendered = placeholder_pattern().replace_all(&self.template, |caps: &regex::Captures<'_>| {
            bindings
                .get(&caps[1])
                .cloned()
                .unwrap_or_default()
        });

        Ok(rendered.into_owned())
    }
}

impl From<&str> for PromptTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

/// Truncates text to the first `cap` whitespace-delimited words.
///
/// Words are kept in original order and rejoined with single spaces;
/// any remainder is discarded silently. This is a cost/latency bound on
/// raw user text, not a content-quality filter.
#[must_use]
pub fn truncate_words(text: &str, cap: usize) -> String {
    text.split_whitespace()
        .take(cap)
        .collect::<Vec<_>>()
        .join(" ")
}
