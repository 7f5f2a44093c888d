use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::portfolio::error::ExtractError;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 180;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";

/// Application configuration loaded from environment variables.
/// Startup fails if the selected provider is missing its credentials.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub extraction_timeout_secs: u64,
    pub provider: ProviderConfig,
}

/// Which backend is active for this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    Gemini,
    OpenAi,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(ExtractError::Configuration(format!(
                "AI_PROVIDER '{other}' is not one of anthropic, gemini, openai, ollama"
            ))),
        }
    }
}

/// Settings for the single active provider. Credentials are only read for the selected one.
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub http_timeout_secs: u64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let provider = ProviderConfig::from_lookup(|key| std::env::var(key).ok())?;

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            extraction_timeout_secs: parse_env(
                "EXTRACTION_TIMEOUT_SECS",
                DEFAULT_EXTRACTION_TIMEOUT_SECS,
            )?,
            provider,
        })
    }
}

impl ProviderConfig {
    /// Resolves the active provider from a key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ExtractError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let kind = match get("AI_PROVIDER") {
            Some(name) => name.parse::<ProviderKind>()?,
            None => ProviderKind::Anthropic,
        };

        let http_timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ExtractError::Configuration(format!(
                    "HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
                ))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let require_key = |var: &str| {
            get(var).ok_or_else(|| {
                ExtractError::Configuration(format!(
                    "provider '{kind}' selected but required environment variable '{var}' is not set"
                ))
            })
        };

        let (api_key, model, endpoint) = match kind {
            ProviderKind::Anthropic => (
                Some(require_key("ANTHROPIC_API_KEY")?),
                get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
                crate::providers::anthropic::API_URL.to_string(),
            ),
            ProviderKind::Gemini => (
                Some(require_key("GEMINI_API_KEY")?),
                get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                crate::providers::gemini::API_BASE.to_string(),
            ),
            ProviderKind::OpenAi => (
                Some(require_key("OPENAI_API_KEY")?),
                get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ),
            // Local inference server, no credential.
            ProviderKind::Ollama => (
                None,
                get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                get("OLLAMA_ENDPOINT").unwrap_or_else(|| DEFAULT_OLLAMA_ENDPOINT.to_string()),
            ),
        };

        Ok(ProviderConfig {
            kind,
            api_key,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http_timeout_secs,
        })
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_anthropic() {
        let config = ProviderConfig::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.kind, ProviderKind::Anthropic);
        assert_eq!(config.model, DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_missing_credential_is_configuration_error() {
        let err = ProviderConfig::from_lookup(lookup(&[("AI_PROVIDER", "openai")])).unwrap_err();
        match err {
            ExtractError::Configuration(msg) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let err = ProviderConfig::from_lookup(lookup(&[
            ("AI_PROVIDER", "gemini"),
            ("GEMINI_API_KEY", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ExtractError::Configuration(_)));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = ProviderConfig::from_lookup(lookup(&[("AI_PROVIDER", "markov")])).unwrap_err();
        assert!(matches!(err, ExtractError::Configuration(_)));
    }

    #[test]
    fn test_ollama_needs_no_key_and_trims_endpoint() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("AI_PROVIDER", "Ollama"),
            ("OLLAMA_ENDPOINT", "http://gpu-box:11434/"),
            ("OLLAMA_MODEL", "qwen2.5:14b"),
        ]))
        .unwrap();
        assert_eq!(config.kind, ProviderKind::Ollama);
        assert!(config.api_key.is_none());
        assert_eq!(config.endpoint, "http://gpu-box:11434");
        assert_eq!(config.model, "qwen2.5:14b");
    }

    #[test]
    fn test_other_providers_credentials_not_required() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("AI_PROVIDER", "openai"),
            ("OPENAI_API_KEY", "sk-openai"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, DEFAULT_OPENAI_BASE_URL);
    }

    #[test]
    fn test_invalid_http_timeout_rejected() {
        let err = ProviderConfig::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk"),
            ("HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ExtractError::Configuration(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "sk-secret")])).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
