//! A scripted model client that records every invocation.

use crate::errors::ModelError;
use crate::model::{InvocationOptions, ModelClient, ModelResponse};
use crate::persona::Persona;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// One recorded `invoke` call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The fully composed prompt.
    pub prompt: String,
    /// The persona name the invocation was scoped by.
    pub persona: String,
    /// The effective sampling temperature.
    pub temperature: f64,
}

#[derive(Debug)]
enum ScriptedReply {
    Content(String),
    Delayed(String, Duration),
    Failure(ModelError),
}

/// A model client that returns queued replies in order.
///
/// With an empty queue, `invoke` fails with
/// [`ModelError::Unavailable`] so a test that under-scripts its
/// pipeline fails loudly instead of hanging.
#[derive(Debug, Default)]
pub struct MockModelClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockModelClient {
    /// Creates a client with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    pub fn enqueue_reply(&self, content: impl Into<String>) {
        self.replies
            .lock()
            .push_back(ScriptedReply::Content(content.into()));
    }

    /// Queues a reply that arrives only after `delay`.
    pub fn enqueue_delayed_reply(&self, content: impl Into<String>, delay: Duration) {
        self.replies
            .lock()
            .push_back(ScriptedReply::Delayed(content.into(), delay));
    }

    /// Queues a transport failure.
    pub fn enqueue_failure(&self, error: ModelError) {
        self.replies.lock().push_back(ScriptedReply::Failure(error));
    }

    /// Returns the number of invocations so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns every recorded invocation, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn invoke(
        &self,
        prompt: &str,
        persona: &Persona,
        options: &InvocationOptions,
    ) -> Result<ModelResponse, ModelError> {
        self.requests.lock().push(RecordedRequest {
            prompt: prompt.to_string(),
            persona: persona.name.clone(),
            temperature: options.temperature(),
        });

        let reply = self.replies.lock().pop_front();
        match reply {
            Some(ScriptedReply::Content(content)) => {
                Ok(ModelResponse::new(content).with_model("mock"))
            }
            Some(ScriptedReply::Delayed(content, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(ModelResponse::new(content).with_model("mock"))
            }
            Some(ScriptedReply::Failure(error)) => Err(error),
            None => Err(ModelError::unavailable("mock has no scripted reply")),
        }
    }
}
