//! Run status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution status of a pipeline run.
///
/// Transitions are strictly `Pending -> Running -> {Running | Completed |
/// Failed}`. `Completed` is reached only after the goal stage succeeds;
/// `Failed` is terminal and the originating error travels with the run
/// result, not with the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "stage")]
pub enum RunStatus {
    /// The run has not started executing stages.
    Pending,
    /// The run is executing the named stage.
    Running(String),
    /// The goal stage produced its artifact.
    Completed,
    /// A stage failed and the run was aborted.
    Failed,
}

impl RunStatus {
    /// Returns true if the run reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running(stage) => write!(f, "running({stage})"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
