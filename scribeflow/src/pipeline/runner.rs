//! Sequential pipeline execution.
//!
//! One run executes its stages strictly in declared order: a stage's
//! prompt deliberately embeds earlier stages' validated text, so
//! reordering or speculative parallelism would silently change
//! semantics. Independent runs share no mutable state and may execute
//! concurrently against the same pipeline.

use super::cancellation::CancellationToken;
use super::inputs::StageInputs;
use super::spec::StageSpec;
use crate::config::PipelineConfig;
use crate::core::{RunStatus, StageArtifact, UserInput};
use crate::errors::{MissingDependencyError, ModelError, ScribeflowError};
use crate::model::{InvocationOptions, ModelClient, ModelResponse};
use crate::persona::Persona;
use crate::template::truncate_words;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Reserved binding the orchestrator injects into every render. A
/// composer-supplied value of the same name takes precedence.
const WORD_TARGET_BINDING: &str = "word_target";

/// A stage spec with its persona resolved from the registry.
#[derive(Debug, Clone)]
pub(super) struct BoundStage {
    pub(super) spec: StageSpec,
    pub(super) persona: Arc<Persona>,
}

/// The result of a completed run: the goal artifact plus full
/// provenance.
///
/// Every artifact the run published travels with the report, because
/// later prompts embedded earlier validated text and callers audit the
/// chain. The run itself is discarded; the report is all that survives.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Unique identifier of this run.
    pub run_id: Uuid,
    /// The pipeline that produced the report.
    pub pipeline: String,
    /// Terminal status; always [`RunStatus::Completed`] on a report.
    pub status: RunStatus,
    /// Every artifact published during the run, keyed by stage name.
    pub artifacts: HashMap<String, Arc<StageArtifact>>,
    /// The goal stage's artifact.
    pub goal: Arc<StageArtifact>,
    /// Total run duration in milliseconds.
    pub duration_ms: f64,
}

impl RunReport {
    /// Returns the goal stage's artifact.
    #[must_use]
    pub fn goal(&self) -> &StageArtifact {
        &self.goal
    }
}

/// A validated, executable pipeline.
///
/// Immutable after construction; safe to share across concurrent runs.
pub struct Pipeline {
    name: String,
    stages: Vec<BoundStage>,
    goal_index: usize,
    config: PipelineConfig,
    client: Arc<dyn ModelClient>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stages.len())
            .field("goal", &self.stages[self.goal_index].spec.name)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub(super) fn new(
        name: String,
        stages: Vec<BoundStage>,
        goal_index: usize,
        config: PipelineConfig,
        client: Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            name,
            stages,
            goal_index,
            config,
            client,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of declared stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the name of the goal stage.
    #[must_use]
    pub fn goal_stage(&self) -> &str {
        &self.stages[self.goal_index].spec.name
    }

    /// Executes a run to the goal stage.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; the run is aborted and no
    /// partial result is ever returned.
    pub async fn run(&self, input: UserInput) -> Result<RunReport, ScribeflowError> {
        self.run_cancellable(input, &CancellationToken::new())
            .await
    }

    /// Executes a run, checking the token between stages.
    ///
    /// Once cancellation is observed the next stage never starts; an
    /// in-flight invocation is not interrupted here.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure, or
    /// [`ScribeflowError::Cancelled`] if the token fires between
    /// stages.
    pub async fn run_cancellable(
        &self,
        input: UserInput,
        token: &CancellationToken,
    ) -> Result<RunReport, ScribeflowError> {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let mut status = RunStatus::Pending;
        tracing::info!(pipeline = %self.name, run_id = %run_id, status = %status, "run started");

        let user_input = Arc::new(input);
        let capped_content = truncate_words(&user_input.content, self.config.input_word_cap);
        let mut artifacts: HashMap<String, Arc<StageArtifact>> = HashMap::new();

        for bound in &self.stages[..=self.goal_index] {
            let stage_name = bound.spec.name.clone();

            if token.is_cancelled() {
                let reason = token
                    .reason()
                    .unwrap_or_else(|| "cancellation requested".to_string());
                status = RunStatus::Failed;
                tracing::warn!(
                    pipeline = %self.name,
                    run_id = %run_id,
                    status = %status,
                    reason = %reason,
                    "run cancelled before stage start"
                );
                return Err(ScribeflowError::Cancelled { reason });
            }

            status = RunStatus::Running(stage_name.clone());
            tracing::info!(
                pipeline = %self.name,
                run_id = %run_id,
                status = %status,
                "stage started"
            );

            let stage_start = Instant::now();
            match self
                .execute_stage(bound, &user_input, &capped_content, &artifacts)
                .await
            {
                Ok(artifact) => {
                    tracing::info!(
                        pipeline = %self.name,
                        run_id = %run_id,
                        stage = %stage_name,
                        duration_ms = stage_start.elapsed().as_secs_f64() * 1000.0,
                        "stage completed"
                    );
                    // Published atomically: no later stage ever sees a
                    // partially-constructed artifact.
                    artifacts.insert(stage_name, Arc::new(artifact));
                }
                Err(err) => {
                    status = RunStatus::Failed;
                    tracing::warn!(
                        pipeline = %self.name,
                        run_id = %run_id,
                        stage = %stage_name,
                        status = %status,
                        error = %err,
                        "stage failed, run aborted"
                    );
                    return Err(err);
                }
            }
        }

        status = RunStatus::Completed;
        let goal_name = self.goal_stage();
        let goal = artifacts
            .get(goal_name)
            .cloned()
            .ok_or_else(|| MissingDependencyError::new(goal_name, goal_name))?;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            pipeline = %self.name,
            run_id = %run_id,
            status = %status,
            duration_ms,
            "run completed"
        );

        Ok(RunReport {
            run_id,
            pipeline: self.name.clone(),
            status,
            artifacts,
            goal,
            duration_ms,
        })
    }

    /// Runs one stage: gather inputs, compose, invoke, parse.
    async fn execute_stage(
        &self,
        bound: &BoundStage,
        user_input: &Arc<UserInput>,
        capped_content: &str,
        artifacts: &HashMap<String, Arc<StageArtifact>>,
    ) -> Result<StageArtifact, ScribeflowError> {
        let spec = &bound.spec;

        let mut gathered = HashMap::with_capacity(spec.dependencies.len());
        for dep in &spec.dependencies {
            let artifact = artifacts
                .get(dep)
                .cloned()
                .ok_or_else(|| MissingDependencyError::new(&spec.name, dep))?;
            gathered.insert(dep.clone(), artifact);
        }
        let declared: HashSet<String> = spec.dependencies.iter().cloned().collect();
        let inputs = StageInputs::new(
            Arc::clone(user_input),
            capped_content.to_string(),
            gathered,
            declared,
            &spec.name,
        );

        let mut bindings = (spec.composer)(&inputs).map_err(|source| {
            ScribeflowError::Template {
                stage: spec.name.clone(),
                source,
            }
        })?;
        let word_target = spec.word_target.unwrap_or(self.config.stage_word_target);
        bindings
            .entry(WORD_TARGET_BINDING.to_string())
            .or_insert_with(|| word_target.to_string());

        let prompt = spec
            .template
            .render(&bindings)
            .map_err(|source| ScribeflowError::Template {
                stage: spec.name.clone(),
                source,
            })?;

        let options = spec
            .options
            .clone()
            .unwrap_or_else(|| self.config.default_options.clone());

        let response = self
            .invoke_with_deadline(&prompt, &bound.persona, &options)
            .await
            .map_err(|source| ScribeflowError::Model {
                stage: spec.name.clone(),
                source,
            })?;

        let payload = spec
            .schema
            .parse(&response.content)
            .map_err(|source| ScribeflowError::Parse {
                stage: spec.name.clone(),
                source,
            })?;

        Ok(StageArtifact::new(&spec.name, payload, response.content))
    }

    /// One outbound call, bounded by the configured deadline.
    async fn invoke_with_deadline(
        &self,
        prompt: &str,
        persona: &Persona,
        options: &InvocationOptions,
    ) -> Result<ModelResponse, ModelError> {
        match self.config.invocation_timeout {
            Some(deadline) => {
                let started = Instant::now();
                match tokio::time::timeout(deadline, self.client.invoke(prompt, persona, options))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ModelError::timeout(
                        u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    )),
                }
            }
            None => self.client.invoke(prompt, persona, options).await,
        }
    }
}
