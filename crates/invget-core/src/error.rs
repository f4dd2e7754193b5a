//! Error types for the invget-core library.

use thiserror::Error;

/// Main error type for the invget library.
#[derive(Error, Debug)]
pub enum InvgetError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Remote completion service error.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Upload import error.
    #[error("import error: {0}")]
    Import(#[from] ImportError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised by a single remote completion attempt.
///
/// The `Display` text is the human message that the orchestrator inspects
/// when deciding whether to retry, switch models, or stop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No API key was configured.
    #[error("Enter your Gemini API key in Settings first")]
    MissingApiKey,

    /// The request exceeded the configured timeout and was cancelled.
    #[error("Gemini request timed out while processing invoice data")]
    Timeout,

    /// The service could not be reached.
    #[error("Could not reach Gemini API. Check your internet connection and API key. ({0})")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The prompt or document was blocked by the service.
    #[error("Gemini blocked this {context} ({reason})")]
    Blocked { context: String, reason: String },

    /// The response carried no text content.
    #[error("Gemini returned an empty response for this {context}")]
    EmptyResponse { context: String },

    /// The response text did not contain a JSON object.
    #[error("Gemini response was not valid JSON")]
    MalformedJson,

    /// The response parsed, but produced no meaningful invoice data.
    #[error("Gemini did not return enough invoice data to populate the form")]
    InsufficientData,

    /// The request could not be built.
    #[error("Internal error: {0}")]
    InvalidRequest(String),
}

/// Errors related to invoice extraction as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Chat extraction was requested with an empty prompt.
    #[error("Describe the invoice you want to generate first")]
    EmptyPrompt,

    /// Chat prompt exceeds the configured length limit.
    #[error("Prompt is too long. Keep it under {max} characters.")]
    PromptTooLong { max: usize },

    /// Every remote attempt and the local fallback failed.
    #[error("{last_message}")]
    Exhausted { last_message: String },
}

/// Errors related to routing an uploaded file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The file claimed to be JSON but did not parse.
    #[error("The JSON file is not valid")]
    InvalidJson,

    /// The JSON parsed but held nothing invoice-shaped.
    #[error("JSON did not contain invoice or bid data")]
    NoInvoiceData,

    /// An invoice-shaped JSON object held no meaningful fields.
    #[error("JSON file was read, but no invoice fields were recognized")]
    UnrecognizedJson,

    /// Plain text or HTML did not map to invoice fields.
    #[error("Could not recognize invoice fields in this file")]
    UnrecognizedText,

    /// The uploaded file had no content.
    #[error("The selected file is empty")]
    EmptyFile,

    /// The file could not be decoded as text.
    #[error("Unable to read file: {0}")]
    Unreadable(String),
}

/// Result type for the invget library.
pub type Result<T> = std::result::Result<T, InvgetError>;
