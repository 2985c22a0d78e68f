//! # Scribeflow
//!
//! Persona-scoped generative-model pipelines with typed, schema-validated
//! stage artifacts.
//!
//! Scribeflow turns free-text user input into a final artifact by routing
//! it through an ordered sequence of model invocations, each scoped by a
//! persona and a prompt template, with typed results flowing from one
//! stage to the next:
//!
//! - **Prompt templates**: placeholder substitution with word-count
//!   bounding of raw user text
//! - **Personas**: named behavioral profiles shared read-only across stages
//! - **Structured parsing**: free-text model output coerced into typed,
//!   schema-validated payloads that fail loudly, never silently
//! - **Sequential orchestration**: each stage's validated artifact becomes
//!   the next stage's input, terminating at a designated goal stage
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scribeflow::prelude::*;
//!
//! let pipeline = PipelineBuilder::new("story")
//!     .stage(craft)?
//!     .stage(review)?      // review.goal() marks the terminal stage
//!     .build(&PersonaRegistry::with_builtins(), PipelineConfig::default(), client)?;
//!
//! let report = pipeline.run(UserInput::new("Tell me a story")).await?;
//! println!("{:?}", report.goal());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod model;
pub mod persona;
pub mod pipeline;
pub mod schema;
pub mod template;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{ArtifactPayload, FieldValue, RunStatus, StageArtifact, UserInput};
    pub use crate::errors::{
        MissingDependencyError, ModelError, PipelineValidationError, ScribeflowError,
        StructuredParseError, TemplateError,
    };
    pub use crate::model::{InvocationOptions, ModelClient, ModelResponse, SelectionCriteria};
    pub use crate::persona::{Persona, PersonaRegistry};
    pub use crate::pipeline::{
        CancellationToken, ComposeFn, Pipeline, PipelineBuilder, RunReport, StageInputs, StageSpec,
    };
    pub use crate::schema::{FieldKind, FieldSpec, OutputSchema};
    pub use crate::template::{truncate_words, PromptBindings, PromptTemplate};
}
