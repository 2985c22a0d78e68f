//! Pipeline builder with construction-time validation.
//!
//! Dependency mistakes are pipeline-definition bugs, so they are caught
//! here, before any run starts: a stage may only depend on stages
//! declared before it, which also rules out cycles by construction.

use super::runner::{BoundStage, Pipeline};
use super::spec::StageSpec;
use crate::config::PipelineConfig;
use crate::errors::{DiagnosticInfo, PipelineValidationError};
use crate::model::ModelClient;
use crate::persona::PersonaRegistry;
use std::sync::Arc;

/// Builder for creating validated pipelines.
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    name: String,
    stages: Vec<StageSpec>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Adds a stage to the pipeline.
    ///
    /// Stages execute in the order they are added.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec is invalid, the name is already
    /// used, or a declared dependency does not name an earlier stage.
    pub fn stage(mut self, spec: StageSpec) -> Result<Self, PipelineValidationError> {
        spec.validate()?;

        if self.stages.iter().any(|s| s.name == spec.name) {
            return Err(PipelineValidationError::new(format!(
                "Stage name '{}' is already used",
                spec.name
            ))
            .with_stages(vec![spec.name.clone()])
            .with_info(
                DiagnosticInfo::new("PIPELINE-001-DUPLICATE", "Duplicate stage name")
                    .with_fix_hint("Give each stage a unique name."),
            ));
        }

        for dep in &spec.dependencies {
            if !self.stages.iter().any(|s| &s.name == dep) {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{}' depends on '{}', which is not an earlier stage",
                    spec.name, dep
                ))
                .with_stages(vec![spec.name.clone(), dep.clone()])
                .with_info(
                    DiagnosticInfo::new(
                        "PIPELINE-002-MISSING_DEP",
                        format!("Dependency '{dep}' not found among earlier stages"),
                    )
                    .with_fix_hint(
                        "Add the dependency before the stage that consumes it; \
                         stages may only consume artifacts produced earlier.",
                    ),
                ));
            }
        }

        self.stages.push(spec);
        Ok(self)
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages added so far.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds the pipeline, binding each stage's persona from the
    /// registry and attaching the configuration and model client.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline is empty, does not have exactly
    /// one goal stage, or references an unregistered persona.
    pub fn build(
        self,
        registry: &PersonaRegistry,
        config: PipelineConfig,
        client: Arc<dyn ModelClient>,
    ) -> Result<Pipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages").with_info(
                DiagnosticInfo::new("PIPELINE-003-EMPTY", "Cannot build an empty pipeline")
                    .with_fix_hint("Add at least one stage before building."),
            ));
        }

        let goals: Vec<&str> = self
            .stages
            .iter()
            .filter(|s| s.goal)
            .map(|s| s.name.as_str())
            .collect();
        if goals.len() != 1 {
            let message = if goals.is_empty() {
                "Pipeline has no goal stage".to_string()
            } else {
                format!("Pipeline has multiple goal stages: {}", goals.join(", "))
            };
            return Err(PipelineValidationError::new(message)
                .with_stages(goals.iter().map(ToString::to_string).collect())
                .with_info(
                    DiagnosticInfo::new(
                        "PIPELINE-004-GOAL",
                        "Exactly one stage must be marked as the goal",
                    )
                    .with_fix_hint("Mark the terminal stage with StageSpec::goal()."),
                ));
        }

        let mut bound = Vec::with_capacity(self.stages.len());
        for spec in self.stages {
            let Some(persona) = registry.get(&spec.persona) else {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{}' references unknown persona '{}'",
                    spec.name, spec.persona
                ))
                .with_stages(vec![spec.name.clone()])
                .with_info(
                    DiagnosticInfo::new(
                        "PIPELINE-005-PERSONA",
                        format!("Persona '{}' is not registered", spec.persona),
                    )
                    .with_fix_hint("Register the persona before building the pipeline."),
                ));
            };
            bound.push(BoundStage { spec, persona });
        }

        // Index is safe: exactly one goal was verified above.
        #[allow(clippy::unwrap_used)]
        let goal_index = bound.iter().position(|b| b.spec.goal).unwrap();
        let unreachable: Vec<&str> = bound[goal_index + 1..]
            .iter()
            .map(|b| b.spec.name.as_str())
            .collect();
        if !unreachable.is_empty() {
            tracing::warn!(
                pipeline = %self.name,
                stages = ?unreachable,
                "stages declared after the goal will never execute"
            );
        }

        Ok(Pipeline::new(self.name, bound, goal_index, config, client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OutputSchema;
    use crate::testing::MockModelClient;
    use std::collections::HashMap;

    fn spec(name: &str) -> StageSpec {
        StageSpec::new(
            name,
            "storyteller",
            "Say something.",
            Arc::new(|_| Ok(HashMap::new())),
            OutputSchema::Text,
        )
    }

    fn build_parts() -> (PersonaRegistry, PipelineConfig, Arc<MockModelClient>) {
        (
            PersonaRegistry::with_builtins(),
            PipelineConfig::default(),
            Arc::new(MockModelClient::new()),
        )
    }

    #[test]
    fn test_duplicate_stage_name() {
        let result = PipelineBuilder::new("p")
            .stage(spec("craft"))
            .unwrap()
            .stage(spec("craft"));

        let err = result.unwrap_err();
        assert_eq!(err.info.unwrap().code, "PIPELINE-001-DUPLICATE");
    }

    #[test]
    fn test_dependency_must_be_earlier_stage() {
        let result = PipelineBuilder::new("p").stage(spec("review").with_dependency("craft"));

        let err = result.unwrap_err();
        assert_eq!(err.info.unwrap().code, "PIPELINE-002-MISSING_DEP");
        assert_eq!(err.stages, vec!["review", "craft"]);
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let (registry, config, client) = build_parts();
        let err = PipelineBuilder::new("p")
            .build(&registry, config, client)
            .unwrap_err();

        assert_eq!(err.info.unwrap().code, "PIPELINE-003-EMPTY");
    }

    #[test]
    fn test_goal_required() {
        let (registry, config, client) = build_parts();
        let err = PipelineBuilder::new("p")
            .stage(spec("craft"))
            .unwrap()
            .build(&registry, config, client)
            .unwrap_err();

        assert_eq!(err.info.unwrap().code, "PIPELINE-004-GOAL");
    }

    #[test]
    fn test_multiple_goals_rejected() {
        let (registry, config, client) = build_parts();
        let err = PipelineBuilder::new("p")
            .stage(spec("craft").goal())
            .unwrap()
            .stage(spec("review").goal())
            .unwrap()
            .build(&registry, config, client)
            .unwrap_err();

        let err_info = err.info.unwrap();
        assert_eq!(err_info.code, "PIPELINE-004-GOAL");
        assert_eq!(err.stages, vec!["craft", "review"]);
    }

    #[test]
    fn test_unknown_persona_rejected() {
        let (registry, config, client) = build_parts();
        let mut spec = spec("craft").goal();
        spec.persona = "nobody".to_string();

        let err = PipelineBuilder::new("p")
            .stage(spec)
            .unwrap()
            .build(&registry, config, client)
            .unwrap_err();

        assert_eq!(err.info.unwrap().code, "PIPELINE-005-PERSONA");
    }

    #[test]
    fn test_build_success() {
        let (registry, config, client) = build_parts();
        let pipeline = PipelineBuilder::new("story")
            .stage(spec("craft"))
            .unwrap()
            .stage(spec("review").with_dependency("craft").goal())
            .unwrap()
            .build(&registry, config, client)
            .unwrap();

        assert_eq!(pipeline.name(), "story");
        assert_eq!(pipeline.stage_count(), 2);
        assert_eq!(pipeline.goal_stage(), "review");
    }
}
