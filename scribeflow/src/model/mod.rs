//! Opaque boundary to the generative model.
//!
//! The core treats the model as a black box: a composed prompt, a
//! persona, and invocation options go in; raw text comes out. Exactly
//! one outbound call per invocation — retry policy lives with the
//! caller, not here, and responses are never cached or deduplicated
//! (identical inputs may produce different output).

use crate::errors::{ModelError, PipelineValidationError};
use crate::persona::Persona;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy for picking among available model backends.
///
/// Opaque to the core; only the [`ModelClient`] implementation
/// interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionCriteria {
    /// Let the client pick a backend.
    Auto,
    /// Request a specific backend by name.
    ByName(String),
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self::Auto
    }
}

impl fmt::Display for SelectionCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::ByName(name) => write!(f, "by_name({name})"),
        }
    }
}

/// Options applied to a single model invocation.
///
/// Immutable value; a stage may override the pipeline-wide default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationOptions {
    selection_criteria: SelectionCriteria,
    temperature: f64,
}

impl InvocationOptions {
    /// Creates invocation options.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `temperature` is outside
    /// `[0.0, 2.0]`. The range is never clamped silently.
    pub fn new(
        selection_criteria: SelectionCriteria,
        temperature: f64,
    ) -> Result<Self, PipelineValidationError> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(PipelineValidationError::new(format!(
                "temperature {temperature} is outside the valid range [0.0, 2.0]"
            )));
        }
        Ok(Self {
            selection_criteria,
            temperature,
        })
    }

    /// Returns the backend-selection policy.
    #[must_use]
    pub const fn selection_criteria(&self) -> &SelectionCriteria {
        &self.selection_criteria
    }

    /// Returns the sampling temperature.
    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }
}

impl Default for InvocationOptions {
    fn default() -> Self {
        Self {
            selection_criteria: SelectionCriteria::Auto,
            temperature: 0.7,
        }
    }
}

/// A model response: raw text plus transport metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The raw text of the response.
    pub content: String,
    /// The backend model that produced it, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Transport latency in milliseconds, if measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
}

impl ModelResponse {
    /// Creates a response carrying only content.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: None,
            latency_ms: None,
        }
    }

    /// Sets the backend model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the measured latency.
    #[must_use]
    pub fn with_latency_ms(mut self, latency_ms: f64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Client for the generative-model transport.
///
/// Implementations issue exactly one outbound call per `invoke` and may
/// be shared across concurrent runs as long as each call is
/// self-contained. If the underlying transport imposes a concurrency
/// limit, serializing or queuing is the client's responsibility. A
/// caller-supplied deadline is enforced by the orchestrator, which maps
/// it to [`ModelError::Timeout`]; clients that can propagate deadlines
/// to the transport should do so.
#[async_trait]
pub trait ModelClient: Send + Sync + fmt::Debug {
    /// Invokes the model with a fully composed prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Unavailable`] or [`ModelError::Timeout`]
    /// on transport failure. No implicit retries.
    async fn invoke(
        &self,
        prompt: &str,
        persona: &Persona,
        options: &InvocationOptions,
    ) -> Result<ModelResponse, ModelError>;
}
