//! Mock backend for testing
//!
//! Scripted responses plus a call counter, so tests can assert both what
//! the pipeline produced and whether the LLM was invoked at all.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{GenerationParams, LlmBackend};

/// Mock LLM backend for testing
///
/// Responses are served from a queue in FIFO order; once the queue is empty
/// every call returns `{}`. Cloning shares the queue and counter.
#[derive(Clone)]
pub struct MockBackend {
    responses: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<AtomicUsize>,
    /// Whether health_check should return true
    healthy: bool,
    /// When set, every call fails with this upstream status
    fail_status: Option<u16>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            healthy: true,
            fail_status: None,
        }
    }

    /// Create a mock backend whose every call fails with the given status
    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::new()
        }
    }

    /// Queue a scripted response
    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("mock response queue poisoned")
            .push_back(response.into());
    }

    /// Number of completion calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, _prompt: &str, _params: GenerationParams) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = self.fail_status {
            return Err(Error::Generation {
                status,
                body: "mock failure".to_string(),
            });
        }

        let next = self
            .responses
            .lock()
            .expect("mock response queue poisoned")
            .pop_front();
        Ok(next.unwrap_or_else(|| "{}".to_string()))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let mock = MockBackend::new();
        mock.push_response("first");
        mock.push_response("second");

        let params = GenerationParams::default();
        assert_eq!(mock.complete("p", params).await.unwrap(), "first");
        assert_eq!(mock.complete("p", params).await.unwrap(), "second");
        // Drained queue falls back to empty JSON
        assert_eq!(mock.complete("p", params).await.unwrap(), "{}");
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockBackend::failing(503);
        let err = mock
            .complete("p", GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation { status: 503, .. }));
    }
}
