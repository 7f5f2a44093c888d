// Résumé → portfolio extraction pipeline.
// Stages: upload sniffing, text extraction (text-only providers), provider call,
// response parsing, normalization. The orchestrator wires them in that order.

pub mod contract;
pub mod error;
pub mod handlers;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod response_parser;
pub mod skills;
pub mod stats;
pub mod text_extractor;
pub mod upload;
