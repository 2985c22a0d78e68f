//! Stage specifications.

use super::StageInputs;
use crate::errors::{PipelineValidationError, TemplateError};
use crate::model::InvocationOptions;
use crate::schema::OutputSchema;
use crate::template::{PromptBindings, PromptTemplate};
use std::fmt;
use std::sync::Arc;

/// A stage's prompt-composition function.
///
/// Maps the stage's typed inputs to a template-ready binding map.
pub type ComposeFn =
    Arc<dyn Fn(&StageInputs) -> Result<PromptBindings, TemplateError> + Send + Sync>;

/// Specification for a single stage in a pipeline.
///
/// Each stage declares what it consumes (earlier stages' artifacts, the
/// user input), the persona and options its invocation is scoped by, how
/// its prompt is composed, and the schema of the artifact it produces.
#[derive(Clone)]
pub struct StageSpec {
    /// The unique name of the stage.
    pub name: String,
    /// The persona the stage invokes the model as.
    pub persona: String,
    /// Names of earlier stages whose artifacts this stage consumes.
    pub dependencies: Vec<String>,
    /// The stage's prompt template.
    pub template: PromptTemplate,
    /// Maps the stage's inputs to template bindings.
    pub composer: ComposeFn,
    /// The declared shape of the stage's output.
    pub schema: OutputSchema,
    /// Invocation options; `None` uses the pipeline default.
    pub options: Option<InvocationOptions>,
    /// Word target embedded into prompt text; `None` uses the pipeline
    /// default.
    pub word_target: Option<usize>,
    /// Whether this stage's artifact is the pipeline's terminal result.
    pub goal: bool,
}

impl StageSpec {
    /// Creates a new stage specification.
    pub fn new(
        name: impl Into<String>,
        persona: impl Into<String>,
        template: impl Into<PromptTemplate>,
        composer: ComposeFn,
        schema: OutputSchema,
    ) -> Self {
        Self {
            name: name.into(),
            persona: persona.into(),
            dependencies: Vec::new(),
            template: template.into(),
            composer,
            schema,
            options: None,
            word_target: None,
            goal: false,
        }
    }

    /// Declares a dependency on an earlier stage's artifact.
    #[must_use]
    pub fn with_dependency(mut self, stage: impl Into<String>) -> Self {
        self.dependencies.push(stage.into());
        self
    }

    /// Declares dependencies on earlier stages' artifacts.
    #[must_use]
    pub fn with_dependencies(mut self, stages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies.extend(stages.into_iter().map(Into::into));
        self
    }

    /// Overrides the pipeline-default invocation options.
    #[must_use]
    pub fn with_options(mut self, options: InvocationOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Overrides the pipeline-default word target.
    #[must_use]
    pub const fn with_word_target(mut self, target: usize) -> Self {
        self.word_target = Some(target);
        self
    }

    /// Marks this stage as the pipeline's goal.
    #[must_use]
    pub const fn goal(mut self) -> Self {
        self.goal = true;
        self
    }

    /// Validates the stage specification in isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the stage depends on
    /// itself.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new(
                "Stage name cannot be empty or whitespace-only",
            ));
        }
        if self.dependencies.iter().any(|dep| dep == &self.name) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' cannot depend on itself",
                self.name
            ))
            .with_stages(vec![self.name.clone()]));
        }
        Ok(())
    }
}

impl fmt::Debug for StageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageSpec")
            .field("name", &self.name)
            .field("persona", &self.persona)
            .field("dependencies", &self.dependencies)
            .field("schema", &self.schema)
            .field("goal", &self.goal)
            .finish_non_exhaustive()
    }
}
