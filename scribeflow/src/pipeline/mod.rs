//! Pipeline definition and orchestration.
//!
//! A pipeline is a finite ordered sequence of named stages built and
//! validated up front. Each run seeds the artifact set with the user
//! input, executes stages in declared order (compose prompt, invoke
//! model, parse result), and stops as soon as the goal stage's artifact
//! is produced.

mod builder;
mod cancellation;
mod inputs;
mod runner;
mod spec;

#[cfg(test)]
mod integration_tests;

pub use builder::PipelineBuilder;
pub use cancellation::CancellationToken;
pub use inputs::StageInputs;
pub use runner::{Pipeline, RunReport};
pub use spec::{ComposeFn, StageSpec};
