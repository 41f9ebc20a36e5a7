//! Scripted generation backend for deterministic testing.
//!
//! Each call pops the next scripted outcome; once the script is exhausted the
//! default outcome repeats. Every request is logged for assertions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vibe_inference::mock::MockGenerationBackend;
//!
//! let primary = MockGenerationBackend::new("primary")
//!     .then_fail("quota exhausted")
//!     .with_default_text("{}");
//! assert_eq!(primary.call_count(), 0);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use vibe_core::{
    ContentPart, Error, GenerationBackend, GenerationRequest, GenerationResponse, Result,
};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Text(String),
    Image { mime_type: String, data: String },
    /// A successful call with no parts.
    Empty,
    Fail(String),
}

impl MockOutcome {
    fn into_result(self) -> Result<GenerationResponse> {
        match self {
            MockOutcome::Text(text) => Ok(GenerationResponse::from_text(text)),
            MockOutcome::Image { mime_type, data } => Ok(GenerationResponse {
                parts: vec![ContentPart::InlineData { mime_type, data }],
            }),
            MockOutcome::Empty => Ok(GenerationResponse::default()),
            MockOutcome::Fail(message) => Err(Error::Request(message)),
        }
    }
}

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    model: String,
    latency: Duration,
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    default: MockOutcome,
    call_log: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockGenerationBackend {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            latency: Duration::ZERO,
            script: Arc::new(Mutex::new(VecDeque::new())),
            default: MockOutcome::Empty,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful text response.
    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.push(MockOutcome::Text(text.into()))
    }

    /// Queue a failure.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(MockOutcome::Fail(message.into()))
    }

    /// Queue a response carrying an inline image.
    pub fn then_image(self, mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.push(MockOutcome::Image {
            mime_type: mime_type.into(),
            data: data.into(),
        })
    }

    /// Queue an empty response.
    pub fn then_empty(self) -> Self {
        self.push(MockOutcome::Empty)
    }

    /// Outcome used once the script runs out.
    pub fn with_default_text(mut self, text: impl Into<String>) -> Self {
        self.default = MockOutcome::Text(text.into());
        self
    }

    /// Fail every unscripted call.
    pub fn always_fail(mut self, message: impl Into<String>) -> Self {
        self.default = MockOutcome::Fail(message.into());
        self
    }

    /// Simulated latency for every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Get all logged requests for assertion.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    fn push(self, outcome: MockOutcome) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.call_log.lock().unwrap().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        outcome.into_result()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
