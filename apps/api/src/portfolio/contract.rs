//! Extraction Contract: the instruction + schema payload every provider receives unchanged.
//!
//! Built once at startup and shared through `AppState`; adapters receive it explicitly on
//! every call and never read prompt constants themselves.

use crate::portfolio::prompts::{
    CONTRACT_VERSION, DOCUMENT_TEXT_BLOCK, EXTRACTION_SYSTEM, EXTRACTION_TASK, PORTFOLIO_SCHEMA,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionContract {
    pub version: &'static str,
    pub system: &'static str,
    /// Year the contract was rendered for; normalization uses the same one.
    pub current_year: i32,
    /// Task block with the schema already rendered in.
    task: String,
}

impl ExtractionContract {
    /// Renders the contract for the given current year.
    pub fn new(current_year: i32) -> Self {
        let task = EXTRACTION_TASK
            .replace("{schema}", PORTFOLIO_SCHEMA)
            .replace("{current_year}", &current_year.to_string());
        Self {
            version: CONTRACT_VERSION,
            system: EXTRACTION_SYSTEM,
            current_year,
            task,
        }
    }

    pub fn schema(&self) -> &'static str {
        PORTFOLIO_SCHEMA
    }

    /// User prompt for multimodal providers; the document travels alongside as bytes.
    pub fn prompt_for_attachment(&self) -> String {
        self.task.replace("{document_ref}", "attached to this message")
    }

    /// User prompt for text-only providers, with the extracted text appended.
    pub fn prompt_for_text(&self, document_text: &str) -> String {
        let mut prompt = self.task.replace("{document_ref}", "below");
        prompt.push_str(&DOCUMENT_TEXT_BLOCK.replace("{document_text}", document_text));
        prompt
    }
}
