//! Google Gemini adapter (multimodal: the document travels as `inline_data`).

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{error_from_response, non_empty, InputMode, Provider, ProviderError, ProviderInput};
use crate::portfolio::contract::ExtractionContract;

pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

impl GeminiResponse {
    fn text(self) -> Option<String> {
        let content = self.candidates?.into_iter().next()?.content?;
        Some(content.parts.into_iter().filter_map(|p| p.text).collect())
    }
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: String, model: String, api_base: String) -> Self {
        Self {
            client,
            api_key,
            model,
            api_base,
        }
    }

    fn build_request(&self, contract: &ExtractionContract, input: ProviderInput<'_>) -> GeminiRequest {
        let parts = match input {
            ProviderInput::Document { bytes, mime } => vec![
                GeminiPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: mime.to_string(),
                        data: STANDARD.encode(bytes),
                    },
                },
                GeminiPart::Text {
                    text: contract.prompt_for_attachment(),
                },
            ],
            ProviderInput::Text(text) => vec![GeminiPart::Text {
                text: contract.prompt_for_text(text),
            }],
        };

        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text {
                    text: contract.system.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts,
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.2,
                response_mime_type: "application/json",
            },
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Multimodal
    }

    async fn complete(
        &self,
        contract: &ExtractionContract,
        input: ProviderInput<'_>,
    ) -> Result<String, ProviderError> {
        let request = self.build_request(contract, input);
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(self.name(), response).await);
        }

        let body: GeminiResponse = response.json().await?;
        non_empty(body.text())
    }
}
