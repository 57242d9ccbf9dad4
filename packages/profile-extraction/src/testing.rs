//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the profile
//! extraction library without making real LLM calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{CompletionError, CompletionResult};
use crate::traits::completion::CompletionClient;
use crate::types::message::{RequestMessage, Role};

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Error(String),
    Timeout,
}

/// Record of a call made to the mock completion client.
#[derive(Debug, Clone)]
pub struct MockCompletionCall {
    pub model: String,
    pub messages: Vec<RequestMessage>,
    pub timeout: Duration,
}

impl MockCompletionCall {
    /// Content of the user message, if any.
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A completion client that replays a fixed script of responses.
///
/// Each `generate` call consumes the next scripted entry. Once the script
/// runs out every call fails with an API error.
///
/// # Example
///
/// ```rust
/// use profile_extraction::testing::MockCompletion;
///
/// let mock = MockCompletion::new()
///     .respond("I think the answer is {name: Ada")
///     .respond(r#"{"name": "Ada"}"#);
/// ```
#[derive(Default, Clone)]
pub struct MockCompletion {
    script: Arc<RwLock<VecDeque<Scripted>>>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<MockCompletionCall>>>,
}

impl MockCompletion {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.script
            .write()
            .unwrap()
            .push_back(Scripted::Text(text.into()));
        self
    }

    /// Queue a provider failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.script
            .write()
            .unwrap()
            .push_back(Scripted::Error(message.into()));
        self
    }

    /// Queue a timeout.
    pub fn time_out(self) -> Self {
        self.script.write().unwrap().push_back(Scripted::Timeout);
        self
    }

    /// Queue the same response `times` times.
    pub fn respond_repeatedly(self, text: impl Into<String>, times: usize) -> Self {
        let text = text.into();
        (0..times).fold(self, |mock, _| mock.respond(text.clone()))
    }

    /// Delay every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockCompletionCall> {
        self.calls.read().unwrap().clone()
    }

    /// Get the number of generate calls.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Number of scripted entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.read().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn generate(
        &self,
        messages: &[RequestMessage],
        model: &str,
        timeout: Duration,
    ) -> CompletionResult<String> {
        self.calls.write().unwrap().push(MockCompletionCall {
            model: model.to_string(),
            messages: messages.to_vec(),
            timeout,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.write().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Error(message)) => Err(CompletionError::Api(message)),
            Some(Scripted::Timeout) => Err(CompletionError::Timeout {
                seconds: timeout.as_secs(),
            }),
            None => Err(CompletionError::Api("mock script exhausted".into())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_is_replayed_in_order() {
        let mock = MockCompletion::new().respond("one").fail("down").respond("two");
        let messages = vec![RequestMessage::user("hi")];
        let timeout = Duration::from_secs(5);

        assert_eq!(mock.generate(&messages, "m", timeout).await.unwrap(), "one");
        assert!(matches!(
            mock.generate(&messages, "m", timeout).await,
            Err(CompletionError::Api(_))
        ));
        assert_eq!(mock.generate(&messages, "m", timeout).await.unwrap(), "two");
        assert!(mock.generate(&messages, "m", timeout).await.is_err());

        assert_eq!(mock.call_count(), 4);
        assert_eq!(mock.remaining(), 0);
        assert_eq!(mock.calls()[0].user_content(), Some("hi"));
    }

    #[tokio::test]
    async fn test_timeout_entry() {
        let mock = MockCompletion::new().time_out();
        let result = mock
            .generate(&[RequestMessage::user("x")], "m", Duration::from_secs(7))
            .await;
        assert!(matches!(result, Err(CompletionError::Timeout { seconds: 7 })));
    }
}
