//! Inbound document payload: MIME inference and the PDF/DOC/DOCX allow-list.

use bytes::Bytes;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    pub fn mime(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => MIME_PDF,
            DocumentKind::Doc => MIME_DOC,
            DocumentKind::Docx => MIME_DOCX,
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        // Declared types may carry parameters, e.g. "application/pdf; charset=binary".
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            MIME_PDF | "application/x-pdf" => Some(DocumentKind::Pdf),
            MIME_DOC => Some(DocumentKind::Doc),
            MIME_DOCX => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

/// A résumé upload whose type has been confirmed as PDF, DOC, or DOCX.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub bytes: Bytes,
    pub kind: DocumentKind,
    pub file_name: Option<String>,
}

impl DocumentUpload {
    /// Infers the document type from magic bytes first, then the declared MIME type,
    /// then the file extension. Returns a user-facing message on rejection.
    pub fn new(
        bytes: Bytes,
        declared_mime: Option<&str>,
        file_name: Option<String>,
    ) -> Result<Self, String> {
        if bytes.is_empty() {
            return Err("The uploaded résumé is empty".to_string());
        }

        let sniffed = infer::get(&bytes).map(|t| t.mime_type());
        let kind = match sniffed {
            Some(mime) => DocumentKind::from_mime(mime).or_else(|| {
                // Generic containers (zip, ole) can still be a Word document.
                if matches!(mime, "application/zip" | "application/x-ole-storage") {
                    declared_kind(declared_mime, file_name.as_deref())
                } else {
                    None
                }
            }),
            None => declared_kind(declared_mime, file_name.as_deref()),
        };

        let kind = kind.ok_or_else(|| {
            format!(
                "Unsupported résumé format{}; upload a PDF, DOC, or DOCX file",
                sniffed.map(|m| format!(" ({m})")).unwrap_or_default()
            )
        })?;

        Ok(Self {
            bytes,
            kind,
            file_name,
        })
    }

    pub fn mime(&self) -> &'static str {
        self.kind.mime()
    }
}

fn declared_kind(declared_mime: Option<&str>, file_name: Option<&str>) -> Option<DocumentKind> {
    declared_mime
        .and_then(DocumentKind::from_mime)
        .or_else(|| file_name.and_then(DocumentKind::from_file_name))
}
