//! Text Extractor: PDF bytes to plain text for text-only providers.
//!
//! `pdf-extract` is CPU-bound and panics on some malformed files, so extraction runs
//! inside `tokio::task::spawn_blocking`; a panic surfaces as a join error and is
//! reported as an extraction failure like any other parse error.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::portfolio::error::ExtractError;

const PAGE_BREAK: char = '\x0C';
const PDF_HINT: &str =
    "The PDF could not be read. Re-export it from your editor (\"Save as PDF\") or try a DOCX file.";
const EMPTY_HINT: &str =
    "No selectable text was found. Scanned résumés are not supported; upload a text-based PDF.";

/// Extracts the text of every page, one page per paragraph.
pub async fn extract_text(bytes: Bytes) -> Result<String, ExtractError> {
    let len = bytes.len();
    let text = tokio::task::spawn_blocking(move || extract_text_sync(&bytes))
        .await
        .map_err(|e| {
            warn!("PDF extraction task aborted ({len} bytes): {e}");
            ExtractError::extraction(format!("PDF parser crashed: {e}"), PDF_HINT)
        })??;

    debug!("Extracted {} chars of text from {len}-byte PDF", text.len());
    Ok(text)
}

/// Synchronous core of [`extract_text`].
pub fn extract_text_sync(bytes: &[u8]) -> Result<String, ExtractError> {
    let raw = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        ExtractError::extraction(format!("PDF could not be parsed: {e}"), PDF_HINT)
    })?;

    let text = assemble_pages(&raw);
    if text.trim().is_empty() {
        return Err(ExtractError::extraction(
            "PDF contains no extractable text",
            EMPTY_HINT,
        ));
    }
    Ok(text)
}

/// Splits the raw dump on form feeds, collapses whitespace inside each text run (line),
/// drops empty runs, and joins pages with a blank line.
fn assemble_pages(raw: &str) -> String {
    raw.split(PAGE_BREAK)
        .map(|page| {
            page.lines()
                .map(|run| run.split_whitespace().collect::<Vec<_>>().join(" "))
                .filter(|run| !run.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Writes small, well-formed PDFs for tests.
#[cfg(test)]
pub(crate) mod test_pdf {
    /// One US-letter page. `line` is drawn in Helvetica when given; otherwise the page is blank.
    pub fn single_page(line: Option<&str>) -> Vec<u8> {
        let content = line
            .map(|l| format!("BT /F1 12 Tf 72 720 Td ({l}) Tj ET"))
            .unwrap_or_default();
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref = pdf.len();
        let size = objects.len() + 1;
        pdf.extend_from_slice(format!("xref\n0 {size}\n0000000000 65535 f \n").as_bytes());
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!("trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n")
                .as_bytes(),
        );
        pdf
    }
}
