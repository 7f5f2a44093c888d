/// Provider adapters: the single point of entry for every language-model call in Folio.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// The orchestrator only sees `dyn Provider` and its `InputMode`.
///
/// Multimodal: anthropic, gemini (raw document bytes).
/// Text-only: openai, ollama (pre-extracted text).
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::config::{ProviderConfig, ProviderKind};
use crate::portfolio::contract::ExtractionContract;
use crate::portfolio::error::ExtractError;

pub mod anthropic;
pub mod gemini;
#[cfg(test)]
pub mod mock;
pub mod ollama;
pub mod openai;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}

/// How a provider wants the résumé delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Raw document bytes plus MIME type.
    Multimodal,
    /// Plain text produced by the text extractor.
    TextOnly,
}

/// The document as handed to an adapter.
#[derive(Debug, Clone, Copy)]
pub enum ProviderInput<'a> {
    Document { bytes: &'a [u8], mime: &'a str },
    Text(&'a str),
}

/// One interchangeable language-model backend.
///
/// Implementations hold no per-call state; the same instance serves concurrent requests.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    fn input_mode(&self) -> InputMode;

    /// Sends the contract plus the document, returning the model's raw text answer.
    async fn complete(
        &self,
        contract: &ExtractionContract,
        input: ProviderInput<'_>,
    ) -> Result<String, ProviderError>;
}

/// Builds the adapter selected by configuration.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>, ExtractError> {
    let client = http_client(config.http_timeout_secs)?;
    let api_key = || {
        config.api_key.clone().ok_or_else(|| {
            ExtractError::Configuration(format!("provider '{}' has no API key", config.kind))
        })
    };

    let provider: Arc<dyn Provider> = match config.kind {
        ProviderKind::Anthropic => Arc::new(anthropic::AnthropicProvider::new(
            client,
            api_key()?,
            config.model.clone(),
            config.endpoint.clone(),
        )),
        ProviderKind::Gemini => Arc::new(gemini::GeminiProvider::new(
            client,
            api_key()?,
            config.model.clone(),
            config.endpoint.clone(),
        )),
        ProviderKind::OpenAi => Arc::new(openai::OpenAiProvider::new(
            client,
            api_key()?,
            config.model.clone(),
            config.endpoint.clone(),
        )),
        ProviderKind::Ollama => Arc::new(ollama::OllamaProvider::new(
            client,
            config.model.clone(),
            config.endpoint.clone(),
        )),
    };
    Ok(provider)
}

fn http_client(timeout_secs: u64) -> Result<Client, ExtractError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ExtractError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Turns a non-success response into `ProviderError::Api`, preferring the provider's own
/// error message when the body is JSON of the usual `{"error": {"message": ..}}` shape.
pub(crate) async fn error_from_response(provider: &str, response: Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!("{provider} API returned {status}: {body}");
    ProviderError::Api {
        status,
        message: api_error_message(&body),
    }
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            let error = v.get("error")?;
            error
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| error.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Rejects blank model answers so the parser never sees an empty string.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, ProviderError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(ProviderError::EmptyContent),
    }
}
