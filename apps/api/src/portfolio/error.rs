//! Failure taxonomy for the extraction pipeline.
//!
//! Every stage either returns a well-formed value or exactly one of these kinds.
//! The HTTP layer decides messaging and retry UX; this module only classifies.

use thiserror::Error;

use crate::providers::ProviderError;

/// Longest raw-response excerpt carried by a parse failure.
pub const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document could not be turned into usable text.
    #[error("Document extraction failed: {message}")]
    Extraction { message: String, hint: String },

    /// Transport, authentication, or quota failure from the active backend.
    #[error("Provider '{provider}' failed: {source}")]
    Provider {
        provider: &'static str,
        #[source]
        source: ProviderError,
    },

    /// The provider answered, but nothing usable could be recovered from the answer.
    #[error("Could not parse provider response ({reason}); excerpt: {excerpt:?}")]
    Parse { reason: String, excerpt: String },

    /// Deployment defect: the selected provider is missing settings.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ExtractError {
    pub fn extraction(message: impl Into<String>, hint: impl Into<String>) -> Self {
        ExtractError::Extraction {
            message: message.into(),
            hint: hint.into(),
        }
    }

    pub fn parse(reason: impl Into<String>, raw: &str) -> Self {
        ExtractError::Parse {
            reason: reason.into(),
            excerpt: excerpt(raw),
        }
    }

    /// Short machine-readable kind, used in logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Extraction { .. } => "EXTRACTION_FAILURE",
            ExtractError::Provider { .. } => "PROVIDER_FAILURE",
            ExtractError::Parse { .. } => "PARSE_FAILURE",
            ExtractError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// First `EXCERPT_CHARS` characters of `raw`, trimmed, with an ellipsis when cut.
pub fn excerpt(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out: String = trimmed.chars().take(EXCERPT_CHARS).collect();
    if trimmed.chars().count() > EXCERPT_CHARS {
        out.push('…');
    }
    out
}
