//! Remote extraction with model fallback and local parser fallback.
//!
//! Attempts run strictly in sequence over `(model, schema mode)`. Each model
//! gets a schema-constrained call first; a second, unconstrained call is made
//! only when the first failure says the schema was rejected. A "model not
//! found" style failure moves on to the next model. Anything else ends the
//! remote phase, and the heuristic parser gets a turn on the raw text.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use super::diagnostics::DiagnosticSink;
use crate::canonical::canonicalize;
use crate::error::{ExtractionError, RemoteError};
use crate::locator::locate_invoice;
use crate::models::config::{InvgetConfig, DEFAULT_MODEL};
use crate::models::invoice::Invoice;
use crate::normalize::normalize_space;
use crate::parser::parse_invoice_text;
use crate::pdf::extract_pdf_text;
use crate::remote::client::{
    block_reason, parse_json_from_text, response_text, CompletionClient, CompletionRequest,
    InlineDocument,
};
use crate::remote::prompt::{chat_prompt, document_prompt};

/// Calls made per model: schema-constrained, then unconstrained.
const ATTEMPTS_PER_MODEL: usize = 2;

/// Per-call settings, passed in rather than read from global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSettings {
    /// API key; empty skips the remote phase.
    pub api_key: String,
    /// Preferred model.
    pub model: String,
    /// Models tried after the preferred and default model.
    pub fallback_models: Vec<String>,
    /// Longest accepted chat prompt, in characters.
    pub chat_max_chars: usize,
}

impl ExtractionSettings {
    pub fn from_config(config: &InvgetConfig) -> Self {
        Self {
            api_key: config.resolved_api_key().unwrap_or_default(),
            model: config.remote.model.clone(),
            fallback_models: config.remote.fallback_models.clone(),
            chat_max_chars: config.import.chat_max_chars,
        }
    }

    /// Ordered, de-duplicated model list: preferred, default, fallbacks.
    pub fn model_candidates(&self) -> Vec<String> {
        let preferred = match normalize_space(&self.model) {
            model if model.is_empty() => DEFAULT_MODEL.to_string(),
            model => model,
        };

        let mut unique: Vec<String> = Vec::new();
        let all = [preferred, DEFAULT_MODEL.to_string()]
            .into_iter()
            .chain(self.fallback_models.iter().map(|model| normalize_space(model)));
        for model in all {
            if !model.is_empty() && !unique.contains(&model) {
                unique.push(model);
            }
        }
        unique
    }
}

/// Where a successful extraction came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionSource {
    Remote { model: String },
    LocalParser,
}

/// Extracted record plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub invoice: Invoice,
    pub source: ExtractionSource,
}

/// Result of one remote attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(Invoice),
    /// Call the same model again without the response schema.
    RetrySameModel,
    /// Move to the next candidate model.
    AdvanceModel,
    /// Stop the remote phase.
    Fatal(RemoteError),
}

/// Decide what a failed attempt leads to.
pub fn classify_failure(error: &RemoteError, use_schema: bool, is_last_model: bool) -> AttemptOutcome {
    if matches!(
        error,
        RemoteError::Timeout | RemoteError::Network(_) | RemoteError::MissingApiKey
    ) {
        return AttemptOutcome::Fatal(error.clone());
    }

    let message = normalize_space(&error.to_string()).to_lowercase();
    if use_schema && is_schema_rejection(&message) {
        AttemptOutcome::RetrySameModel
    } else if is_model_unavailable(&message) && !is_last_model {
        AttemptOutcome::AdvanceModel
    } else {
        AttemptOutcome::Fatal(error.clone())
    }
}

fn is_schema_rejection(message: &str) -> bool {
    ["responsejsonschema", "response schema", "invalid argument", "unsupported"]
        .iter()
        .any(|needle| message.contains(needle))
}

fn is_model_unavailable(message: &str) -> bool {
    (message.contains("model") && message.contains("not found"))
        || message.contains("unknown model")
        || message.contains("permission denied")
}

/// Drives remote extraction for PDFs and chat prompts.
pub struct Orchestrator<C> {
    client: C,
    settings: ExtractionSettings,
    sink: Arc<dyn DiagnosticSink>,
}

impl<C: CompletionClient> Orchestrator<C> {
    pub fn new(client: C, settings: ExtractionSettings, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            client,
            settings,
            sink,
        }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Extract a record from PDF bytes.
    ///
    /// The PDF goes to the remote model inline. If that fails, the PDF text
    /// layer is run through the heuristic parser.
    pub async fn extract_document(
        &self,
        pdf: &[u8],
        file_name: &str,
    ) -> Result<Extraction, ExtractionError> {
        self.sink.record(
            "Gemini PDF extraction requested",
            &format!("fileName={file_name} fileSize={} model={}", pdf.len(), self.settings.model),
        );

        let remote = if pdf.is_empty() {
            self.sink.record("Gemini extraction failed: could not encode PDF", "");
            Err("Could not encode PDF for Gemini request".to_string())
        } else {
            let document = InlineDocument {
                mime_type: "application/pdf".to_string(),
                data: BASE64.encode(pdf),
            };
            self.sink.record("PDF encoded for Gemini", &format!("base64Length={}", document.data.len()));
            self.run_remote(&document_prompt(), Some(document), "PDF").await
        };

        let last_message = match remote {
            Ok(extraction) => return Ok(extraction),
            Err(message) => message,
        };

        self.sink.record("Starting local PDF parser fallback", "");
        let source_name = if file_name.trim().is_empty() { "invoice.pdf" } else { file_name };
        match extract_pdf_text(pdf) {
            Ok(text) if !normalize_space(&text).is_empty() => {
                self.sink.record("Local PDF parser extracted text", &format!("textLength={}", text.len()));
                if let Some(extraction) = self.local_fallback(&text, source_name) {
                    return Ok(extraction);
                }
                self.sink.record("Local PDF parser text did not map to invoice fields", "");
            }
            Ok(_) => self.sink.record("No selectable text found in PDF", ""),
            Err(e) => {
                warn!("Local PDF fallback failed: {}", e);
                self.sink.record("Local PDF parser fallback failed", &e.to_string());
            }
        }

        self.exhausted(last_message, "Gemini import failed and local fallback could not parse the PDF")
    }

    /// Turn a natural-language request into a record.
    pub async fn extract_prompt(
        &self,
        prompt: &str,
        today: NaiveDate,
    ) -> Result<Extraction, ExtractionError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ExtractionError::EmptyPrompt);
        }
        if prompt.chars().count() > self.settings.chat_max_chars {
            return Err(ExtractionError::PromptTooLong {
                max: self.settings.chat_max_chars,
            });
        }

        self.sink.record(
            "Gemini chat extraction requested",
            &format!("promptLength={} model={}", prompt.chars().count(), self.settings.model),
        );

        let last_message = match self.run_remote(&chat_prompt(prompt, today), None, "chat request").await {
            Ok(extraction) => return Ok(extraction),
            Err(message) => message,
        };

        if let Some(extraction) = self.local_fallback(prompt, "chat-request.txt") {
            return Ok(extraction);
        }

        self.exhausted(last_message, "Gemini could not parse enough invoice data from that request")
    }

    /// Run the model/schema state machine. Returns the last error message
    /// when no attempt produced meaningful data.
    async fn run_remote(
        &self,
        prompt: &str,
        document: Option<InlineDocument>,
        context: &str,
    ) -> Result<Extraction, String> {
        if self.settings.api_key.trim().is_empty() {
            self.sink.record("Gemini extraction stopped: missing API key", context);
            return Err(RemoteError::MissingApiKey.to_string());
        }

        let candidates = self.settings.model_candidates();
        self.sink.record("Gemini model candidates", &candidates.join(", "));

        let mut last_message = String::new();
        'models: for (index, model) in candidates.iter().enumerate() {
            let is_last_model = index + 1 == candidates.len();

            for attempt in 0..ATTEMPTS_PER_MODEL {
                let use_schema = attempt == 0;
                self.sink.record(
                    "Gemini attempt",
                    &format!("model={model} attempt={} useSchema={use_schema}", attempt + 1),
                );

                let request = CompletionRequest {
                    api_key: self.settings.api_key.clone(),
                    model: model.clone(),
                    prompt: prompt.to_string(),
                    document: document.clone(),
                    use_schema,
                };

                let outcome = match self.attempt(&request, context).await {
                    Ok(invoice) => AttemptOutcome::Success(invoice),
                    Err(error) => {
                        last_message = error.to_string();
                        self.sink.record(
                            "Gemini attempt failed",
                            &format!("model={model} attempt={} error={last_message}", attempt + 1),
                        );
                        classify_failure(&error, use_schema, is_last_model)
                    }
                };

                match outcome {
                    AttemptOutcome::Success(invoice) => {
                        info!("Extracted {} via {}", context, model);
                        self.sink.record(
                            "Gemini attempt succeeded",
                            &format!("model={model} attempt={}", attempt + 1),
                        );
                        return Ok(Extraction {
                            invoice,
                            source: ExtractionSource::Remote { model: model.clone() },
                        });
                    }
                    AttemptOutcome::RetrySameModel => {
                        self.sink.record("Retrying same model without schema", model);
                    }
                    AttemptOutcome::AdvanceModel => {
                        self.sink.record("Switching to next model candidate", model);
                        continue 'models;
                    }
                    AttemptOutcome::Fatal(_) => break 'models,
                }
            }
            break;
        }

        self.sink.record(
            "Gemini extraction failed after all attempts",
            if last_message.is_empty() { "No detailed error" } else { last_message.as_str() },
        );
        Err(last_message)
    }

    async fn attempt(&self, request: &CompletionRequest, context: &str) -> Result<Invoice, RemoteError> {
        let payload = self.client.generate(request).await?;
        self.interpret_response(&payload, context)
    }

    /// Turn a response payload into a meaningful record.
    fn interpret_response(&self, payload: &Value, context: &str) -> Result<Invoice, RemoteError> {
        let text = response_text(payload);
        if text.is_empty() {
            let reason = block_reason(payload);
            if !reason.is_empty() {
                self.sink.record("Gemini response blocked", &reason);
                return Err(RemoteError::Blocked {
                    context: context.to_string(),
                    reason,
                });
            }
            self.sink.record("Gemini response had no text content", "");
            return Err(RemoteError::EmptyResponse {
                context: context.to_string(),
            });
        }

        let Some(parsed) = parse_json_from_text(&text) else {
            let preview: String = text.chars().take(220).collect();
            self.sink.record("Gemini response JSON parse failed", &preview);
            return Err(RemoteError::MalformedJson);
        };

        let invoice = canonicalize(locate_invoice(&parsed).unwrap_or(&parsed));
        if !invoice.has_meaningful_data() {
            self.sink.record("Gemini response missing required invoice fields", "");
            return Err(RemoteError::InsufficientData);
        }

        self.sink.record(
            "Gemini response parsed successfully",
            &format!(
                "companyName={} clientName={} items={}",
                invoice.company_name,
                invoice.client_name,
                invoice.items.len()
            ),
        );
        Ok(invoice)
    }

    fn local_fallback(&self, text: &str, source_name: &str) -> Option<Extraction> {
        let invoice = parse_invoice_text(text, source_name);
        if !invoice.has_meaningful_data() {
            return None;
        }
        self.sink.record("Local text parser fallback produced usable invoice data", source_name);
        Some(Extraction {
            invoice,
            source: ExtractionSource::LocalParser,
        })
    }

    fn exhausted(&self, last_message: String, default: &str) -> Result<Extraction, ExtractionError> {
        let last_message = if last_message.is_empty() {
            default.to_string()
        } else {
            last_message
        };
        self.sink.record("Extraction failed after remote and local fallback", &last_message);
        Err(ExtractionError::Exhausted { last_message })
    }
}
