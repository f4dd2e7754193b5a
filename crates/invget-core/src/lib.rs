//! Core library for invoice and bid extraction.
//!
//! This crate provides:
//! - Field and address normalization for loosely typed input
//! - A heuristic parser for flattened invoice text
//! - Canonicalization of arbitrary JSON into one invoice record
//! - Remote model extraction with model fallback and local parser fallback
//! - PDF text layer reading and the embedded payload format

pub mod canonical;
pub mod error;
pub mod extract;
pub mod html;
pub mod import;
pub mod locator;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod payload;
pub mod pdf;
pub mod remote;

pub use canonical::{apply_company_fallback, canonicalize, canonicalize_invoice};
pub use error::{ExtractionError, ImportError, InvgetError, PdfError, RemoteError, Result};
pub use extract::{
    DiagnosticLog, DiagnosticSink, Extraction, ExtractionSettings, ExtractionSource, Orchestrator,
    TracingSink,
};
pub use import::{import_json, import_text, ImportKind, ImportSource, Imported, Importer};
pub use locator::locate_invoice;
pub use models::config::{CompanyProfile, InvgetConfig};
pub use models::invoice::{DiscountType, DocumentType, Invoice, InvoiceTotals, LineItem};
pub use normalize::{normalize_address, normalize_space};
pub use parser::{parse_invoice_text, ExtractionResult, HeuristicInvoiceParser, InvoiceParser};
pub use payload::{encode_payload, extract_embedded_invoice};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use remote::{CompletionClient, CompletionRequest, GeminiClient};
