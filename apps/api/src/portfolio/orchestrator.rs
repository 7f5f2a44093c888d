//! Orchestrator: runs one extraction end to end.
//!
//! upload → (text extraction, text-only providers only) → provider → parse → normalize
//!
//! Stages run strictly in sequence and the first failure ends the request. The
//! orchestrator holds no state; concurrent requests share only the provider and contract.

use tracing::{debug, info, warn};

use crate::models::portfolio::PortfolioRecord;
use crate::portfolio::contract::ExtractionContract;
use crate::portfolio::error::ExtractError;
use crate::portfolio::normalizer::normalize;
use crate::portfolio::response_parser::parse_response;
use crate::portfolio::text_extractor::extract_text;
use crate::portfolio::upload::{DocumentKind, DocumentUpload};
use crate::providers::{InputMode, Provider, ProviderError, ProviderInput};

const PDF_ONLY_HINT: &str = "This provider cannot read Word documents; upload the résumé as a PDF.";

/// Produces a normalized `PortfolioRecord` from an uploaded résumé.
///
/// `photo_url` is the caller's photo reference; it wins over anything the model returns.
pub async fn extract_portfolio(
    provider: &dyn Provider,
    contract: &ExtractionContract,
    upload: &DocumentUpload,
    photo_url: Option<&str>,
) -> Result<PortfolioRecord, ExtractError> {
    info!(
        provider = provider.name(),
        contract = contract.version,
        mime = upload.mime(),
        bytes = upload.bytes.len(),
        "Extracting portfolio"
    );

    let raw = match provider.input_mode() {
        InputMode::Multimodal => {
            let input = ProviderInput::Document {
                bytes: &upload.bytes,
                mime: upload.mime(),
            };
            call_provider(provider, contract, input).await?
        }
        InputMode::TextOnly => {
            if upload.kind != DocumentKind::Pdf {
                return Err(ExtractError::extraction(
                    format!(
                        "{} documents cannot be read by the '{}' provider",
                        upload.mime(),
                        provider.name()
                    ),
                    PDF_ONLY_HINT,
                ));
            }
            let text = extract_text(upload.bytes.clone()).await?;
            call_provider(provider, contract, ProviderInput::Text(&text)).await?
        }
    };
    debug!("Provider returned {} chars", raw.len());

    let parsed = parse_response(&raw)?;
    let record = normalize(&parsed, photo_url, contract.current_year)?;

    info!(
        experience = record.experience.len(),
        projects = record.projects.len(),
        skill_categories = record.about.skills.len(),
        "Portfolio extracted"
    );
    Ok(record)
}

async fn call_provider(
    provider: &dyn Provider,
    contract: &ExtractionContract,
    input: ProviderInput<'_>,
) -> Result<String, ExtractError> {
    provider.complete(contract, input).await.map_err(|source| {
        warn!(provider = provider.name(), "Provider call failed: {source}");
        match source {
            // Raised before any request is sent.
            ProviderError::UnsupportedInput(detail) => ExtractError::extraction(detail, PDF_ONLY_HINT),
            source => ExtractError::Provider {
                provider: provider.name(),
                source,
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::upload::{MIME_DOCX, MIME_PDF};
    use crate::portfolio::text_extractor::test_pdf;
    use crate::providers::mock::{MockProvider, RecordedInput};
    use bytes::Bytes;

    const PDF_BYTES: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n";

    const MODEL_ANSWER: &str = r#"Sure! Here is the JSON:
```json
{
  "personalInfo": {"fullName": "Jane Doe", "email": "JANE@EXAMPLE.COM", "photoUrl": "https://model.example/p.png"},
  "about": {"skills": [{"category": "programming languages", "tags": ["Rust", "rust", "Go"]}]},
  "experience": [{"jobTitle": "Backend Engineer", "company": "Acme", "dates": "2019-02 – Present",
                  "responsibilities": ["a", "b", "c", "d", "e", "f", "g", "h"]}]
}
```"#;

    fn contract() -> ExtractionContract {
        ExtractionContract::new(2025)
    }

    fn pdf_upload() -> DocumentUpload {
        DocumentUpload::new(Bytes::from_static(PDF_BYTES), Some(MIME_PDF), None).unwrap()
    }

    fn docx_upload() -> DocumentUpload {
        // Zip container magic; the declared type decides it is a DOCX.
        DocumentUpload::new(
            Bytes::from_static(b"PK\x03\x04\x14\x00\x06\x00\x08\x00\x00\x00!\x00"),
            Some(MIME_DOCX),
            Some("cv.docx".to_string()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_multimodal_happy_path_sends_document_bytes() {
        let provider = MockProvider::answering(InputMode::Multimodal, MODEL_ANSWER);
        let record = extract_portfolio(
            &provider,
            &contract(),
            &pdf_upload(),
            Some("https://cdn.example.com/me.jpg"),
        )
        .await
        .unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(
            provider.inputs(),
            vec![RecordedInput::Document {
                len: PDF_BYTES.len(),
                mime: MIME_PDF.to_string()
            }]
        );

        assert_eq!(record.personal_info.full_name, "Jane Doe");
        assert_eq!(record.personal_info.initials, "JD");
        assert_eq!(record.personal_info.email.as_deref(), Some("jane@example.com"));
        assert_eq!(record.personal_info.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(
            record.personal_info.photo_url.as_deref(),
            Some("https://cdn.example.com/me.jpg")
        );
        assert_eq!(record.experience[0].responsibilities.len(), 6);
        assert_eq!(record.about.skills[0].category, "Programming Languages");
        assert_eq!(record.about.skills[0].tags, vec!["Rust", "Go"]);
        assert_eq!(record.about.stats.len(), 3);
        assert!(!record.about.extended_bio.is_empty());
    }

    #[tokio::test]
    async fn test_multimodal_provider_receives_docx_unchanged() {
        let provider = MockProvider::answering(
            InputMode::Multimodal,
            r#"{"personalInfo":{"fullName":"Jane Doe"}}"#,
        );
        extract_portfolio(&provider, &contract(), &docx_upload(), None)
            .await
            .unwrap();
        assert!(matches!(
            &provider.inputs()[0],
            RecordedInput::Document { mime, .. } if mime == MIME_DOCX
        ));
    }

    #[tokio::test]
    async fn test_unreadable_pdf_never_reaches_text_only_provider() {
        let provider = MockProvider::answering(InputMode::TextOnly, "{}");
        let err = extract_portfolio(&provider, &contract(), &pdf_upload(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Extraction { .. }), "{err:?}");
        assert_eq!(provider.calls(), 0);
    }

    fn generated_pdf_upload(line: Option<&str>) -> DocumentUpload {
        let pdf = test_pdf::single_page(line);
        DocumentUpload::new(Bytes::from(pdf), Some(MIME_PDF), Some("cv.pdf".to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_blank_pdf_never_reaches_text_only_provider() {
        let provider = MockProvider::answering(InputMode::TextOnly, "{}");
        let err = extract_portfolio(&provider, &contract(), &generated_pdf_upload(None), None)
            .await
            .unwrap_err();
        match err {
            ExtractError::Extraction { message, .. } => {
                assert_eq!(message, "PDF contains no extractable text")
            }
            other => panic!("expected extraction failure, got {other:?}"),
        }
        assert_eq!(provider.calls(), 0);
        assert!(provider.inputs().is_empty());
    }

    #[tokio::test]
    async fn test_text_only_provider_receives_extracted_text() {
        let provider = MockProvider::answering(
            InputMode::TextOnly,
            r#"{"personalInfo": {"fullName": "Jane Doe", "title": "Rust Engineer"}}"#,
        );
        let upload = generated_pdf_upload(Some("Jane Doe Rust Engineer"));
        let record = extract_portfolio(&provider, &contract(), &upload, None)
            .await
            .unwrap();

        assert_eq!(
            provider.inputs(),
            vec![RecordedInput::Text("Jane Doe Rust Engineer".to_string())]
        );
        assert_eq!(record.personal_info.full_name, "Jane Doe");
        assert_eq!(record.personal_info.title.as_deref(), Some("Rust Engineer"));
    }

    #[tokio::test]
    async fn test_normalization_uses_the_contract_year() {
        let provider = MockProvider::answering(
            InputMode::Multimodal,
            r#"{"personalInfo": {"fullName": "Jane Doe"},
                "experience": [{"jobTitle": "Dev", "company": "Acme", "dates": "2015 – Present"}]}"#,
        );
        let record = extract_portfolio(&provider, &ExtractionContract::new(2020), &pdf_upload(), None)
            .await
            .unwrap();
        assert_eq!(record.about.stats[0].value, "5+");
    }

    #[tokio::test]
    async fn test_word_document_on_text_only_provider_asks_for_pdf() {
        let provider = MockProvider::answering(InputMode::TextOnly, "{}");
        let err = extract_portfolio(&provider, &contract(), &docx_upload(), None)
            .await
            .unwrap_err();
        match err {
            ExtractError::Extraction { hint, .. } => assert!(hint.contains("upload the résumé as a PDF")),
            other => panic!("expected extraction failure, got {other:?}"),
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_classified() {
        let provider = MockProvider::failing(InputMode::Multimodal, 401, "invalid x-api-key");
        let err = extract_portfolio(&provider, &contract(), &pdf_upload(), None)
            .await
            .unwrap_err();
        match err {
            ExtractError::Provider { provider, source } => {
                assert_eq!(provider, "mock");
                assert!(matches!(source, ProviderError::Api { status: 401, .. }));
            }
            other => panic!("expected provider failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_answer_is_parse_failure() {
        let provider = MockProvider::answering(InputMode::Multimodal, "I cannot read this file.");
        let err = extract_portfolio(&provider, &contract(), &pdf_upload(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "PARSE_FAILURE");
    }

    #[tokio::test]
    async fn test_answer_without_name_is_parse_failure() {
        let provider = MockProvider::answering(InputMode::Multimodal, r#"{"about": {}}"#);
        let err = extract_portfolio(&provider, &contract(), &pdf_upload(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "PARSE_FAILURE");
    }
}
