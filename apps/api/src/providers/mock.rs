//! Scripted in-memory provider for pipeline and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{InputMode, Provider, ProviderError, ProviderInput};
use crate::portfolio::contract::ExtractionContract;

/// What the mock saw on one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedInput {
    Document { len: usize, mime: String },
    Text(String),
}

pub struct MockProvider {
    mode: InputMode,
    response: Result<String, (u16, String)>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<RecordedInput>>,
}

impl MockProvider {
    pub fn answering(mode: InputMode, response: impl Into<String>) -> Self {
        Self::with_response(mode, Ok(response.into()))
    }

    /// Fails every call with `ProviderError::Api`.
    pub fn failing(mode: InputMode, status: u16, message: impl Into<String>) -> Self {
        Self::with_response(mode, Err((status, message.into())))
    }

    fn with_response(mode: InputMode, response: Result<String, (u16, String)>) -> Self {
        Self {
            mode,
            response,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<RecordedInput> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn input_mode(&self) -> InputMode {
        self.mode
    }

    async fn complete(
        &self,
        _contract: &ExtractionContract,
        input: ProviderInput<'_>,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let recorded = match input {
            ProviderInput::Document { bytes, mime } => RecordedInput::Document {
                len: bytes.len(),
                mime: mime.to_string(),
            },
            ProviderInput::Text(text) => RecordedInput::Text(text.to_string()),
        };
        self.inputs.lock().unwrap().push(recorded);

        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err((status, message)) => Err(ProviderError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
