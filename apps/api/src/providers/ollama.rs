//! Ollama adapter for local inference (text-only, non-streaming).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{error_from_response, non_empty, InputMode, Provider, ProviderError, ProviderInput};
use crate::portfolio::contract::ExtractionContract;

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: String,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

pub struct OllamaProvider {
    client: Client,
    model: String,
    endpoint: String,
}

impl OllamaProvider {
    pub fn new(client: Client, model: String, endpoint: String) -> Self {
        Self {
            client,
            model,
            endpoint,
        }
    }

    fn build_request<'a>(
        &'a self,
        contract: &'a ExtractionContract,
        input: ProviderInput<'_>,
    ) -> Result<OllamaRequest<'a>, ProviderError> {
        let ProviderInput::Text(text) = input else {
            return Err(ProviderError::UnsupportedInput(
                "ollama adapter is text-only; run the text extractor first".to_string(),
            ));
        };

        Ok(OllamaRequest {
            model: &self.model,
            system: contract.system,
            prompt: contract.prompt_for_text(text),
            // The parser needs the whole answer; streaming would only be buffered anyway.
            stream: false,
            format: "json",
            options: OllamaOptions { temperature: 0.2 },
        })
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
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
        let url = format!("{}/api/generate", self.endpoint);

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(self.name(), response).await);
        }

        let body: OllamaResponse = response.json().await?;
        non_empty(Some(body.response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_disables_streaming_and_requests_json() {
        let provider = OllamaProvider::new(
            Client::new(),
            "llama-test".to_string(),
            "http://localhost:11434".to_string(),
        );
        let contract = ExtractionContract::new(2025);
        let request = provider
            .build_request(&contract, ProviderInput::Text("Jane"))
            .unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["format"], "json");
        assert_eq!(json["system"], contract.system);
        assert!(json["prompt"].as_str().unwrap().ends_with("Jane"));
    }
}
