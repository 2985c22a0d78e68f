//! Typed inputs a stage composes its prompt from.

use crate::core::{StageArtifact, UserInput};
use crate::errors::MissingDependencyError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// An immutable view of the run's published artifacts, restricted to a
/// stage's declared dependencies.
///
/// Accessing a stage that was not declared is an error even when its
/// artifact exists in the run.
#[derive(Debug, Clone)]
pub struct StageInputs {
    user_input: Arc<UserInput>,
    capped_content: String,
    artifacts: HashMap<String, Arc<StageArtifact>>,
    declared: HashSet<String>,
    stage_name: String,
}

impl StageInputs {
    pub(super) fn new(
        user_input: Arc<UserInput>,
        capped_content: String,
        artifacts: HashMap<String, Arc<StageArtifact>>,
        declared: HashSet<String>,
        stage_name: impl Into<String>,
    ) -> Self {
        Self {
            user_input,
            capped_content,
            artifacts,
            declared,
            stage_name: stage_name.into(),
        }
    }

    /// Returns the user input that seeded the run.
    #[must_use]
    pub fn user_input(&self) -> &UserInput {
        &self.user_input
    }

    /// Returns the user content truncated to the pipeline's input word
    /// cap, ready for substitution into a prompt.
    #[must_use]
    pub fn user_content(&self) -> &str {
        &self.capped_content
    }

    /// Returns a declared dependency's artifact.
    ///
    /// # Errors
    ///
    /// Returns [`MissingDependencyError`] if the stage was not declared
    /// as a dependency, or its artifact has not been published.
    pub fn artifact(&self, stage: &str) -> Result<&StageArtifact, MissingDependencyError> {
        if !self.declared.contains(stage) {
            return Err(MissingDependencyError::new(&self.stage_name, stage));
        }
        self.artifacts
            .get(stage)
            .map(Arc::as_ref)
            .ok_or_else(|| MissingDependencyError::new(&self.stage_name, stage))
    }

    /// Returns true if an artifact is available for the given stage.
    #[must_use]
    pub fn contains(&self, stage: &str) -> bool {
        self.artifacts.contains_key(stage)
    }

    /// Returns the names of the available artifacts.
    #[must_use]
    pub fn stages(&self) -> Vec<&str> {
        self.artifacts.keys().map(String::as_str).collect()
    }
}
