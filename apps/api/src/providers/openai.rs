//! OpenAI-compatible chat completions adapter (text-only).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_from_response, non_empty, InputMode, Provider, ProviderError, ProviderInput};
use crate::portfolio::contract::ExtractionContract;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(client: Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }

    fn build_request<'a>(
        &'a self,
        contract: &'a ExtractionContract,
        input: ProviderInput<'_>,
    ) -> Result<ChatRequest<'a>, ProviderError> {
        let ProviderInput::Text(text) = input else {
            return Err(ProviderError::UnsupportedInput(
                "openai adapter is text-only; run the text extractor first".to_string(),
            ));
        };

        Ok(ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: contract.system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: contract.prompt_for_text(text),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.2,
        })
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn input_mode(&self) -> InputMode {
        InputMode::TextOnly
    }

    async fn complete(
        &self,
        contract: &ExtractionContract,
        input: ProviderInput<'_>,
    ) -> Result<String, ProviderError> {
        let request = self.build_request(contract, input)?;
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(self.name(), response).await);
        }

        let body: ChatCompletionResponse = response.json().await?;
        if let Some(usage) = &body.usage {
            debug!(
                "openai call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        non_empty(
            body.choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content),
        )
    }
}
