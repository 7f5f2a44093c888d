//! Anthropic Messages API adapter (multimodal: the PDF travels as a `document` block).

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_from_response, non_empty, InputMode, Provider, ProviderError, ProviderInput};
use crate::portfolio::contract::ExtractionContract;

pub const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Document { source: DocumentSource },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct DocumentSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Concatenates every text block; long answers may be split across several.
    fn text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text)
            .collect();
        Some(text)
    }
}

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl AnthropicProvider {
    pub fn new(client: Client, api_key: String, model: String, url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            url,
        }
    }

    fn build_request<'a>(
        &'a self,
        contract: &'a ExtractionContract,
        input: ProviderInput<'_>,
    ) -> Result<AnthropicRequest<'a>, ProviderError> {
        let content = match input {
            ProviderInput::Document { bytes, mime } => {
                if mime != "application/pdf" {
                    return Err(ProviderError::UnsupportedInput(format!(
                        "anthropic accepts PDF documents only, got {mime}"
                    )));
                }
                vec![
                    ContentPart::Document {
                        source: DocumentSource {
                            source_type: "base64",
                            media_type: mime.to_string(),
                            data: STANDARD.encode(bytes),
                        },
                    },
                    ContentPart::Text {
                        text: contract.prompt_for_attachment(),
                    },
                ]
            }
            ProviderInput::Text(text) => vec![ContentPart::Text {
                text: contract.prompt_for_text(text),
            }],
        };

        Ok(AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: contract.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content,
            }],
        })
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Multimodal
    }

    async fn complete(
        &self,
        contract: &ExtractionContract,
        input: ProviderInput<'_>,
    ) -> Result<String, ProviderError> {
        let request_body = self.build_request(contract, input)?;

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(self.name(), response).await);
        }

        let body: AnthropicResponse = response.json().await?;
        if let Some(usage) = &body.usage {
            debug!(
                "anthropic call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        non_empty(body.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(
            Client::new(),
            "sk-test".to_string(),
            "claude-test".to_string(),
            API_URL.to_string(),
        )
    }

    #[test]
    fn test_document_request_shape() {
        let provider = provider();
        let contract = ExtractionContract::new(2025);
        let request = provider
            .build_request(
                &contract,
                ProviderInput::Document {
                    bytes: b"%PDF-1.4",
                    mime: "application/pdf",
                },
            )
            .unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "claude-test");
        assert_eq!(json["system"], contract.system);
        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "document");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "application/pdf");
        assert_eq!(content[0]["source"]["data"], STANDARD.encode(b"%PDF-1.4"));
        assert_eq!(content[1]["type"], "text");
    }

    #[test]
    fn test_word_documents_are_unsupported() {
        let provider = provider();
        let contract = ExtractionContract::new(2025);
        let result = provider.build_request(
            &contract,
            ProviderInput::Document {
                bytes: b"PK",
                mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            },
        );
        assert!(matches!(result, Err(ProviderError::UnsupportedInput(_))));
    }

    #[test]
    fn test_response_text_joins_text_blocks() {
        let body: AnthropicResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"a\":"},{"type":"text","text":"1}"}],
                "usage":{"input_tokens":10,"output_tokens":3}}"#,
        )
        .unwrap();
        assert_eq!(body.text().unwrap(), "{\"a\":1}");
    }
}
