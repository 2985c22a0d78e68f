//! Pipeline-wide configuration.
//!
//! A single immutable value passed to the orchestrator at construction.
//! There is no process-wide default state: two pipelines with different
//! configurations coexist without coupling.

use crate::model::InvocationOptions;
use std::time::Duration;

/// Default word cap applied to raw user text entering a prompt.
pub const DEFAULT_INPUT_WORD_CAP: usize = 100;

/// Default word-count target embedded into prompt text.
pub const DEFAULT_STAGE_WORD_TARGET: usize = 100;

/// Configuration shared by every stage of a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Word-count cap for raw user text substituted into prompts.
    pub input_word_cap: usize,
    /// Word-count target stages embed into their prompt text, unless
    /// overridden per stage.
    pub stage_word_target: usize,
    /// Invocation options used by stages without their own override.
    pub default_options: InvocationOptions,
    /// Deadline applied to each model invocation. `None` waits
    /// indefinitely.
    pub invocation_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_word_cap: DEFAULT_INPUT_WORD_CAP,
            stage_word_target: DEFAULT_STAGE_WORD_TARGET,
            default_options: InvocationOptions::default(),
            invocation_timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input word cap.
    #[must_use]
    pub const fn with_input_word_cap(mut self, cap: usize) -> Self {
        self.input_word_cap = cap;
        self
    }

    /// Sets the per-stage word target.
    #[must_use]
    pub const fn with_stage_word_target(mut self, target: usize) -> Self {
        self.stage_word_target = target;
        self
    }

    /// Sets the default invocation options.
    #[must_use]
    pub fn with_default_options(mut self, options: InvocationOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Sets the per-invocation deadline.
    #[must_use]
    pub const fn with_invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = Some(timeout);
        self
    }
}
