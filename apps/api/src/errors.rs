use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::portfolio::error::ExtractError;
use crate::providers::ProviderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, hint) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
                None,
            ),
            AppError::Extract(ExtractError::Extraction { message, hint }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILURE",
                message.clone(),
                Some(hint.clone()),
            ),
            AppError::Extract(ExtractError::Provider { provider, source }) => {
                tracing::error!("Provider '{provider}' failed: {source}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PROVIDER_FAILURE",
                    provider_message(source),
                    None,
                )
            }
            AppError::Extract(ExtractError::Parse { reason, excerpt }) => {
                tracing::error!("Unparseable provider response ({reason}); excerpt: {excerpt:?}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PARSE_FAILURE",
                    "The AI response could not be turned into a portfolio".to_string(),
                    Some("Try again; a second attempt usually succeeds.".to_string()),
                )
            }
            AppError::Extract(ExtractError::Configuration(msg)) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "The server is not configured for extraction".to_string(),
                    None,
                )
            }
            AppError::Timeout(secs) => {
                tracing::error!("Extraction exceeded {secs}s");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    format!("Extraction did not finish within {secs} seconds"),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(hint) = hint {
            error["hint"] = Value::String(hint);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Status code only; upstream bodies can echo request details and stay in the logs.
fn provider_message(source: &ProviderError) -> String {
    match source {
        ProviderError::Api { status, .. } => {
            format!("The AI provider rejected the request (status {status})")
        }
        ProviderError::Http(e) if e.is_timeout() => "The AI provider did not respond in time".to_string(),
        ProviderError::Http(_) => "The AI provider could not be reached".to_string(),
        ProviderError::EmptyContent => "The AI provider returned an empty answer".to_string(),
        ProviderError::UnsupportedInput(detail) => {
            format!("The AI provider cannot read this document: {detail}")
        }
    }
}
