//! Response Parser: recovers a JSON object from a provider's raw text.
//!
//! Two recovery stages, tried in order, each a pure `&str -> Result<Map, String>`:
//! 1. fence-stripped direct parse
//! 2. outer-brace slice (first `{` through last `}`)
//!
//! When both fail, the error carries both stage messages plus an excerpt of the input.

use serde_json::{Map, Value};
use tracing::debug;

use crate::portfolio::error::ExtractError;

pub type JsonObject = Map<String, Value>;

/// Parses raw provider output into a JSON object.
pub fn parse_response(raw: &str) -> Result<JsonObject, ExtractError> {
    let direct_err = match parse_direct(raw) {
        Ok(obj) => return Ok(obj),
        Err(e) => e,
    };

    match parse_outer_braces(raw) {
        Ok(obj) => {
            debug!("Recovered JSON via outer-brace extraction after: {direct_err}");
            Ok(obj)
        }
        Err(brace_err) => Err(ExtractError::parse(
            format!("direct parse: {direct_err}; outer-brace parse: {brace_err}"),
            raw,
        )),
    }
}

/// Stage 1: trim, strip a surrounding code fence, parse.
fn parse_direct(raw: &str) -> Result<JsonObject, String> {
    parse_object(strip_json_fences(raw))
}

/// Stage 2: parse the greedy `{ … }` span.
fn parse_outer_braces(raw: &str) -> Result<JsonObject, String> {
    let start = raw.find('{').ok_or("no '{' found")?;
    let end = raw.rfind('}').ok_or("no '}' found")?;
    if end < start {
        return Err("last '}' precedes first '{'".to_string());
    }
    parse_object(&raw[start..=end])
}

fn parse_object(text: &str) -> Result<JsonObject, String> {
    match serde_json::from_str::<Value>(text).map_err(|e| e.to_string())? {
        Value::Object(obj) => Ok(obj),
        other => Err(format!("expected a JSON object, found {}", type_name(&other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// A missing closing fence (truncated answer) still drops the opening one.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = if let Some(stripped) = text.strip_prefix("```json") {
        stripped
    } else if let Some(stripped) = text.strip_prefix("```JSON") {
        stripped
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
    } else {
        return text;
    };
    let inner = inner.trim_start();
    inner
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        assert_eq!(strip_json_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_fenced_json_parses() {
        let obj = parse_response("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(Value::Object(obj), json!({"a": 1}));
    }

    #[test]
    fn test_noise_around_object_recovered_by_outer_braces() {
        let obj = parse_response("noise {\"a\":1} trailing").unwrap();
        assert_eq!(Value::Object(obj), json!({"a": 1}));
    }

    #[test]
    fn test_outer_brace_match_is_greedy() {
        let raw = "Here you go: {\"a\": {\"b\": 2}} Let me know if {you} need more.";
        // Greedy span covers "{you}" too, so it is not valid JSON.
        assert!(parse_response(raw).is_err());
        let raw = "Here you go:\n{\"a\": {\"b\": 2}}\nDone.";
        let obj = parse_response(raw).unwrap();
        assert_eq!(obj["a"]["b"], 2);
    }

    #[test]
    fn test_no_json_is_parse_failure() {
        let err = parse_response("no json here").unwrap_err();
        match err {
            ExtractError::Parse { reason, excerpt } => {
                assert!(reason.contains("no '{' found"), "{reason}");
                assert_eq!(excerpt, "no json here");
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn test_top_level_array_is_rejected() {
        let err = parse_response("[1, 2]").unwrap_err();
        match err {
            ExtractError::Parse { reason, .. } => {
                assert!(reason.contains("found an array"), "{reason}")
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn test_array_wrapping_an_object_recovers_the_object() {
        let obj = parse_response("[{\"a\":1}]").unwrap();
        assert_eq!(obj["a"], 1);
    }

    #[test]
    fn test_reversed_braces_fail_cleanly() {
        assert!(parse_response("} nothing {").is_err());
    }

    #[test]
    fn test_failure_reason_keeps_both_stage_errors() {
        let err = parse_response("{\"a\": 1,, }").unwrap_err();
        match err {
            ExtractError::Parse { reason, .. } => {
                assert!(reason.starts_with("direct parse:"));
                assert!(reason.contains("outer-brace parse:"));
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }
}
