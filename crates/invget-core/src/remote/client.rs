//! Completion client abstraction and response helpers.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::RemoteError;
use crate::normalize::normalize_space;

lazy_static! {
    static ref FENCED_BLOCK: Regex = Regex::new(r"(?is)```(?:json)?\s*(.*?)```").unwrap();
}

/// Binary document sent inline with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineDocument {
    /// MIME type, e.g. `application/pdf`.
    pub mime_type: String,
    /// Standard base64 of the document bytes.
    pub data: String,
}

/// One generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub document: Option<InlineDocument>,
    /// Constrain the response to the invoice schema.
    pub use_schema: bool,
}

/// Remote text generation backend.
///
/// Implementations return the raw response payload on success. Transport,
/// timeout and API failures map to [`RemoteError`] variants whose messages
/// drive the retry policy.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(&self, request: &CompletionRequest) -> Result<Value, RemoteError>;
}

/// Text of the first candidate that has any.
pub fn response_text(payload: &Value) -> String {
    let Some(candidates) = payload.get("candidates").and_then(Value::as_array) else {
        return String::new();
    };

    candidates
        .iter()
        .map(|candidate| {
            candidate
                .pointer("/content/parts")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .map(|part| part.get("text").and_then(Value::as_str).unwrap_or(""))
                        .collect::<Vec<_>>()
                        .join("\n")
                        .trim()
                        .to_string()
                })
                .unwrap_or_default()
        })
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Prompt block reason reported by the service, or an empty string.
pub fn block_reason(payload: &Value) -> String {
    payload
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
        .map(normalize_space)
        .unwrap_or_default()
}

/// Parse JSON out of model text.
///
/// Tries the whole text, then the first fenced code block, then the span
/// from the first `{` to the last `}`.
pub fn parse_json_from_text(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut attempts = vec![trimmed];
    if let Some(fenced) = FENCED_BLOCK.captures(trimmed).and_then(|caps| caps.get(1)) {
        attempts.push(fenced.as_str().trim());
    }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            attempts.push(&trimmed[start..=end]);
        }
    }

    attempts
        .into_iter()
        .filter_map(|attempt| serde_json::from_str::<Value>(attempt).ok())
        .find(|value| value.is_object() || value.is_array())
}

/// Human message from an API error payload.
///
/// Prefers `error.message`, then `error.status` with `error.code`, then
/// `fallback`.
pub fn api_error_message(payload: Option<&Value>, fallback: &str) -> String {
    let fallback = match normalize_space(fallback) {
        text if text.is_empty() => "Gemini request failed".to_string(),
        text => text,
    };
    let Some(error) = payload.and_then(|p| p.get("error")).filter(|e| e.is_object()) else {
        return fallback;
    };

    let message = error.get("message").and_then(Value::as_str).map(normalize_space);
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        return message;
    }

    let status = error
        .get("status")
        .and_then(Value::as_str)
        .map(normalize_space)
        .filter(|s| !s.is_empty());
    let code = error.get("code").filter(|c| !c.is_null());

    match (status, code) {
        (Some(status), Some(code)) => format!("{status} ({code})"),
        (Some(status), None) => status,
        (None, Some(code)) => format!("Error {code}"),
        (None, None) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_text_skips_empty_candidates() {
        let payload = json!({
            "candidates": [
                {"content": {"parts": [{"text": "  "}]}},
                {"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}
            ]
        });
        assert_eq!(response_text(&payload), "{\"a\":\n1}");
        assert_eq!(response_text(&json!({})), "");
        assert_eq!(response_text(&Value::Null), "");
    }

    #[test]
    fn test_block_reason() {
        let payload = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert_eq!(block_reason(&payload), "SAFETY");
        assert_eq!(block_reason(&json!({"candidates": []})), "");
    }

    #[test]
    fn test_parse_json_from_text() {
        assert_eq!(parse_json_from_text(r#"{"notes":"x"}"#), Some(json!({"notes": "x"})));
        assert_eq!(
            parse_json_from_text("Here you go:\n```json\n{\"notes\": \"x\"}\n```"),
            Some(json!({"notes": "x"}))
        );
        assert_eq!(
            parse_json_from_text("Result: {\"notes\": \"x\"} hope that helps"),
            Some(json!({"notes": "x"}))
        );
        assert_eq!(parse_json_from_text("no json here"), None);
        assert_eq!(parse_json_from_text("42"), None);
    }

    #[test]
    fn test_api_error_message() {
        let full = json!({"error": {"code": 404, "message": "models/x is not found", "status": "NOT_FOUND"}});
        assert_eq!(api_error_message(Some(&full), "fallback"), "models/x is not found");

        let status_only = json!({"error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}});
        assert_eq!(api_error_message(Some(&status_only), "fallback"), "RESOURCE_EXHAUSTED (429)");

        let code_only = json!({"error": {"code": 500}});
        assert_eq!(api_error_message(Some(&code_only), "fallback"), "Error 500");

        assert_eq!(api_error_message(None, "Gemini request failed (502)"), "Gemini request failed (502)");
        assert_eq!(api_error_message(Some(&json!({"error": "x"})), ""), "Gemini request failed");
    }
}
