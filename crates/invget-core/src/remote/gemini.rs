//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::client::{api_error_message, CompletionClient, CompletionRequest};
use super::schema::invoice_response_schema;
use crate::error::RemoteError;
use crate::models::config::RemoteConfig;
use crate::normalize::normalize_space;

/// Thinking budget for models without a thinking level setting.
const FALLBACK_THINKING_BUDGET: u32 = 1024;

/// HTTP client for the Gemini REST API.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .build()
            .map_err(|e| RemoteError::InvalidRequest(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs.max(1)))
    }

    /// `{base_url}/{model}:generateContent?key={api_key}`
    pub fn endpoint(&self, model: &str, api_key: &str) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| RemoteError::InvalidRequest(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidRequest("base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .push(&format!("{model}:generateContent"));
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}

/// Minimal reasoning hint: gemini-3 models take a level, older ones a budget.
pub fn thinking_config(model: &str) -> Value {
    if normalize_space(model).to_lowercase().starts_with("gemini-3") {
        json!({ "thinkingLevel": "minimal" })
    } else {
        json!({ "thinkingBudget": FALLBACK_THINKING_BUDGET })
    }
}

/// Request body for `generateContent`.
pub fn request_body(request: &CompletionRequest) -> Value {
    let mut parts = vec![json!({ "text": request.prompt })];
    if let Some(document) = &request.document {
        parts.push(json!({
            "inlineData": {
                "mimeType": document.mime_type,
                "data": document.data,
            }
        }));
    }

    let mut generation_config = json!({
        "temperature": 0,
        "responseMimeType": "application/json",
        "thinkingConfig": thinking_config(&request.model),
    });
    if request.use_schema {
        generation_config["responseJsonSchema"] = invoice_response_schema();
    }

    json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": generation_config,
    })
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<Value, RemoteError> {
        let url = self.endpoint(&request.model, &request.api_key)?;
        debug!(
            model = %request.model,
            schema = request.use_schema,
            inline_bytes = request.document.as_ref().map_or(0, |d| d.data.len()),
            "Sending generateContent request"
        );

        let response = self
            .http
            .post(url)
            .timeout(self.timeout)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Timeout
                } else {
                    RemoteError::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let payload = match response.json::<Value>().await {
            Ok(payload) => Some(payload),
            Err(e) if e.is_timeout() => return Err(RemoteError::Timeout),
            Err(e) => {
                warn!("Response body was not JSON: {}", e.without_url());
                None
            }
        };
        debug!(model = %request.model, status = status.as_u16(), "Response received");

        if !status.is_success() {
            let fallback = format!("Gemini request failed ({})", status.as_u16());
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: api_error_message(payload.as_ref(), &fallback),
            });
        }

        Ok(payload.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::client::InlineDocument;

    fn request(model: &str, use_schema: bool) -> CompletionRequest {
        CompletionRequest {
            api_key: "secret".to_string(),
            model: model.to_string(),
            prompt: "Extract".to_string(),
            document: Some(InlineDocument {
                mime_type: "application/pdf".to_string(),
                data: "JVBERi0=".to_string(),
            }),
            use_schema,
        }
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com/v1beta/models/",
            Duration::from_secs(5),
        )
        .unwrap();
        let url = client.endpoint("gemini-2.5-flash", "a b&c").unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent?key=a+b%26c"
        );
    }

    #[test]
    fn test_thinking_config() {
        assert_eq!(thinking_config("gemini-3-flash-preview"), json!({"thinkingLevel": "minimal"}));
        assert_eq!(thinking_config("gemini-2.5-flash"), json!({"thinkingBudget": 1024}));
    }

    #[test]
    fn test_request_body_with_schema() {
        let body = request_body(&request("gemini-3-flash-preview", true));
        let parts = body["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(body["generationConfig"]["temperature"], 0);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert!(body["generationConfig"]["responseJsonSchema"].is_object());
    }

    #[test]
    fn test_request_body_without_schema() {
        let mut req = request("gemini-2.5-flash", false);
        req.document = None;
        let body = request_body(&req);

        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
        assert!(body["generationConfig"].get("responseJsonSchema").is_none());
    }
}
