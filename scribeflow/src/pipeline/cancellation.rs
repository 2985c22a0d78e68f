//! Cooperative run cancellation.

use parking_lot::Mutex;
use std::sync::Arc;

/// A shared flag a caller sets to stop a run between stages.
///
/// The orchestrator checks the token before starting each stage; once
/// cancellation is observed, the next stage never starts. Interrupting
/// an in-flight model invocation is the model client's responsibility.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    reason: Arc<Mutex<Option<String>>>,
}

impl CancellationToken {
    /// Creates a new, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation with a reason.
    ///
    /// The first reason wins; later calls are ignored.
    pub fn cancel(&self, reason: impl Into<String>) {
        let mut guard = self.reason.lock();
        if guard.is_none() {
            *guard = Some(reason.into());
        }
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.reason.lock().is_some()
    }

    /// Returns the cancellation reason, if cancelled.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }
}
