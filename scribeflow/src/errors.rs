//! Error types for the scribeflow pipeline core.
//!
//! Every failure a run can surface is a variant of [`ScribeflowError`];
//! nothing is recovered inside the core. Retry policy belongs to the
//! caller, which observes the error kind and decides.

use thiserror::Error;

/// Maximum length of the raw-text snippet carried by a parse error.
const SNIPPET_LEN: usize = 160;

/// The main error type for scribeflow operations.
///
/// Runtime variants carry the name of the stage that failed so a caller
/// observing a failed run knows exactly where the run stopped.
#[derive(Debug, Error)]
pub enum ScribeflowError {
    /// Pipeline construction failed validation.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// Prompt composition or template substitution failed.
    #[error("stage '{stage}': {source}")]
    Template {
        /// The stage whose prompt could not be composed.
        stage: String,
        /// The underlying template error.
        source: TemplateError,
    },

    /// The model transport failed or timed out.
    #[error("stage '{stage}': {source}")]
    Model {
        /// The stage whose invocation failed.
        stage: String,
        /// The underlying transport error.
        source: ModelError,
    },

    /// The model's response did not match the stage's output schema.
    #[error("stage '{stage}': {source}")]
    Parse {
        /// The stage whose response failed to parse.
        stage: String,
        /// The underlying parse error.
        source: StructuredParseError,
    },

    /// A stage referenced an artifact no earlier stage produced.
    #[error("{0}")]
    MissingDependency(#[from] MissingDependencyError),

    /// The run was cancelled between stages.
    #[error("run cancelled: {reason}")]
    Cancelled {
        /// The reason supplied at cancellation.
        reason: String,
    },
}

impl ScribeflowError {
    /// Returns the name of the stage the error originated in, if any.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::Template { stage, .. } | Self::Model { stage, .. } | Self::Parse { stage, .. } => {
                Some(stage)
            }
            Self::MissingDependency(err) => Some(&err.stage),
            Self::Validation(_) | Self::Cancelled { .. } => None,
        }
    }
}

/// Error raised during prompt composition or template substitution.
///
/// These are programmer errors in the pipeline definition, never a
/// runtime condition, and are not retryable.
#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    /// A referenced placeholder has no supplied value.
    #[error("no value supplied for placeholder '{placeholder}'")]
    MissingValue {
        /// The placeholder that could not be resolved.
        placeholder: String,
    },

    /// A stage's composition function could not produce its bindings.
    #[error("failed to compose bindings: {message}")]
    Binding {
        /// What went wrong while gathering binding values.
        message: String,
    },
}

impl TemplateError {
    /// Creates a missing-value error.
    #[must_use]
    pub fn missing_value(placeholder: impl Into<String>) -> Self {
        Self::MissingValue {
            placeholder: placeholder.into(),
        }
    }

    /// Creates a binding error.
    #[must_use]
    pub fn binding(message: impl Into<String>) -> Self {
        Self::Binding {
            message: message.into(),
        }
    }
}

/// Transient failure of the model transport.
///
/// The core surfaces these as a failed run; it never retries, because a
/// generative call is not idempotent and retrying must be an explicit,
/// visible decision of the caller.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The model backend could not be reached.
    #[error("model unavailable: {message}")]
    Unavailable {
        /// Transport-level detail.
        message: String,
    },

    /// The invocation did not complete before its deadline.
    #[error("model invocation timed out after {elapsed_ms}ms")]
    Timeout {
        /// How long the invocation ran before the deadline fired.
        elapsed_ms: u64,
    },
}

impl ModelError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub const fn timeout(elapsed_ms: u64) -> Self {
        Self::Timeout { elapsed_ms }
    }
}

/// Error raised when a model response does not match the declared schema.
///
/// Carries the offending field and a bounded snippet of the raw text so
/// the caller can log it or retry with an adjusted prompt. The parser
/// never substitutes a default for a missing field.
#[derive(Debug, Clone, Error)]
#[error("field '{field}' {message} (raw: {snippet:?})")]
pub struct StructuredParseError {
    /// The required field that was missing or wrongly kinded.
    pub field: String,
    /// What was wrong with the field.
    pub message: String,
    /// A bounded excerpt of the raw text that failed to parse.
    pub snippet: String,
}

impl StructuredParseError {
    /// Creates a new parse error, truncating the raw text to a bounded
    /// snippet.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>, raw: &str) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            snippet: snippet_of(raw),
        }
    }
}

fn snippet_of(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() <= SNIPPET_LEN {
        return trimmed.to_string();
    }
    let mut end = SNIPPET_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

/// Error raised when a stage references an artifact that is not available.
///
/// This indicates a pipeline-definition bug, not a runtime condition. The
/// builder catches it before any run starts; the runner guards against it
/// anyway and treats it as fatal.
#[derive(Debug, Clone, Error)]
#[error("stage '{stage}' requires artifact '{dependency}' which no earlier stage produced")]
pub struct MissingDependencyError {
    /// The stage attempting the access.
    pub stage: String,
    /// The artifact key that was not available.
    pub dependency: String,
}

impl MissingDependencyError {
    /// Creates a new missing-dependency error.
    #[must_use]
    pub fn new(stage: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            dependency: dependency.into(),
        }
    }
}

/// Diagnostic metadata attached to construction-time validation errors.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticInfo {
    /// Error code (e.g., "PIPELINE-002-MISSING_DEP").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
}

impl DiagnosticInfo {
    /// Creates new diagnostic info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }
}

/// Error raised when pipeline construction fails validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional diagnostic info.
    pub info: Option<DiagnosticInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the diagnostic info.
    #[must_use]
    pub fn with_info(mut self, info: DiagnosticInfo) -> Self {
        self.info = Some(info);
        self
    }
}
