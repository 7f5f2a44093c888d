use std::time::Duration;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::PortfolioRecord;
use crate::portfolio::orchestrator::extract_portfolio;
use crate::portfolio::upload::DocumentUpload;
use crate::state::AppState;

/// Multipart field carrying the résumé file.
pub const RESUME_FIELD: &str = "resume";
/// Optional multipart text field with the caller's photo reference.
pub const PHOTO_URL_FIELD: &str = "photoUrl";

/// POST /api/v1/portfolio/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PortfolioRecord>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("extract", request_id = %request_id, provider = state.provider.name());

    async move {
        let (upload, photo_url) = read_form(multipart).await?;
        info!(
            file_name = upload.file_name.as_deref().unwrap_or("-"),
            kind = upload.mime(),
            "Received résumé"
        );

        let timeout_secs = state.config.extraction_timeout_secs;
        let record = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            extract_portfolio(
                state.provider.as_ref(),
                &state.contract,
                &upload,
                photo_url.as_deref(),
            ),
        )
        .await
        .map_err(|_| AppError::Timeout(timeout_secs))??;

        Ok(Json(record))
    }
    .instrument(span)
    .await
}

async fn read_form(mut multipart: Multipart) -> Result<(DocumentUpload, Option<String>), AppError> {
    let mut resume: Option<(Bytes, Option<String>, Option<String>)> = None;
    let mut photo_url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed multipart body", e))?
    {
        match field.name() {
            Some(RESUME_FIELD) => {
                let content_type = field.content_type().map(String::from);
                let file_name = field.file_name().map(String::from);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Could not read résumé upload", e))?;
                resume = Some((bytes, content_type, file_name));
            }
            Some(PHOTO_URL_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Could not read photoUrl", e))?;
                photo_url = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }

    let (bytes, content_type, file_name) = resume
        .ok_or_else(|| AppError::Validation(format!("Missing '{RESUME_FIELD}' file field")))?;
    let upload =
        DocumentUpload::new(bytes, content_type.as_deref(), file_name).map_err(AppError::Validation)?;
    Ok((upload, photo_url))
}

/// Body-limit overruns keep their 413; every other multipart failure is a bad request.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    let message = format!("{context}: {}", e.body_text());
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::Validation(message)
    }
}
