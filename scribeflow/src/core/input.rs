//! User input that seeds a pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw text supplied by the external caller, plus a creation timestamp.
///
/// Immutable once created. The first pipeline stage consumes it; the
/// orchestrator never modifies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInput {
    /// The raw text content.
    pub content: String,
    /// When the input was created.
    pub timestamp: DateTime<Utc>,
}

impl UserInput {
    /// Creates a new user input stamped with the current time.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a user input with an explicit timestamp.
    #[must_use]
    pub fn at(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            timestamp,
        }
    }
}
