//! Routing uploaded files and chat requests to the right extraction path.
//!
//! JSON goes through the locator and canonicalizer. PDFs are checked for an
//! embedded payload, then sent to the orchestrator. Text and HTML go to the
//! heuristic parser.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

use crate::canonical::{apply_company_fallback, canonicalize};
use crate::error::ImportError;
use crate::extract::diagnostics::DiagnosticSink;
use crate::extract::orchestrator::{ExtractionSource, Orchestrator};
use crate::html::{html_to_text, looks_like_html};
use crate::locator::locate_invoice;
use crate::models::config::CompanyProfile;
use crate::models::invoice::Invoice;
use crate::normalize::normalize_space;
use crate::parser::parse_invoice_text;
use crate::payload::extract_embedded_invoice;
use crate::pdf::extract_pdf_text;
use crate::remote::client::CompletionClient;

/// Upload format, decided from the file name, MIME type and content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Json,
    Pdf,
    Html,
    Text,
}

impl ImportKind {
    /// Detect the format. Extension and MIME type win; `%PDF-` content is a
    /// PDF and tag-shaped text is HTML.
    pub fn detect(file_name: &str, mime_type: &str, content: &[u8]) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        let mime_type = mime_type.to_lowercase();

        if extension == "json" || mime_type.contains("json") {
            Self::Json
        } else if extension == "pdf" || mime_type.contains("pdf") || content.starts_with(b"%PDF-") {
            Self::Pdf
        } else if extension == "html" || extension == "htm" || mime_type.contains("html") {
            Self::Html
        } else if looks_like_html(&String::from_utf8_lossy(content)) {
            Self::Html
        } else {
            Self::Text
        }
    }
}

/// Where an imported record came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    Json,
    EmbeddedPayload,
    Remote { model: String },
    LocalParser,
}

impl From<ExtractionSource> for ImportSource {
    fn from(source: ExtractionSource) -> Self {
        match source {
            ExtractionSource::Remote { model } => Self::Remote { model },
            ExtractionSource::LocalParser => Self::LocalParser,
        }
    }
}

/// An imported record and its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Imported {
    pub invoice: Invoice,
    pub source: ImportSource,
}

/// Import a JSON document of any shape.
pub fn import_json(raw: &str) -> Result<Invoice, ImportError> {
    let payload: Value = serde_json::from_str(raw).map_err(|_| ImportError::InvalidJson)?;
    let candidate = locate_invoice(&payload).ok_or(ImportError::NoInvoiceData)?;

    let invoice = canonicalize(candidate);
    if !invoice.has_meaningful_data() {
        return Err(ImportError::UnrecognizedJson);
    }
    Ok(invoice)
}

/// Import plain text or HTML through the heuristic parser.
///
/// An embedded payload block takes precedence over parsing.
pub fn import_text(raw: &str, file_name: &str, is_html: bool) -> Result<Imported, ImportError> {
    if normalize_space(raw).is_empty() {
        return Err(ImportError::EmptyFile);
    }

    if let Some(invoice) = extract_embedded_invoice(raw) {
        return Ok(Imported {
            invoice,
            source: ImportSource::EmbeddedPayload,
        });
    }

    let text = if is_html || looks_like_html(raw) {
        html_to_text(raw)
    } else {
        raw.to_string()
    };

    let invoice = parse_invoice_text(&text, file_name);
    if !invoice.has_meaningful_data() {
        return Err(ImportError::UnrecognizedText);
    }
    Ok(Imported {
        invoice,
        source: ImportSource::LocalParser,
    })
}

/// Import front end over an [`Orchestrator`].
pub struct Importer<C> {
    orchestrator: Orchestrator<C>,
    company: CompanyProfile,
    sink: Arc<dyn DiagnosticSink>,
}

impl<C: CompletionClient> Importer<C> {
    pub fn new(
        orchestrator: Orchestrator<C>,
        company: CompanyProfile,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            orchestrator,
            company,
            sink,
        }
    }

    /// Import one uploaded file.
    pub async fn import_file(
        &self,
        file_name: &str,
        mime_type: &str,
        content: &[u8],
    ) -> crate::Result<Imported> {
        self.sink.record(
            "Parsing uploaded file",
            &format!("name={file_name} size={} type={mime_type}", content.len()),
        );
        if content.is_empty() {
            return Err(ImportError::EmptyFile.into());
        }

        let kind = ImportKind::detect(file_name, mime_type, content);
        self.sink.record("Import branch selected", &format!("{kind:?}"));

        let imported = match kind {
            ImportKind::Json => {
                let raw = decode_text(content)?;
                Imported {
                    invoice: import_json(&raw)?,
                    source: ImportSource::Json,
                }
            }
            ImportKind::Pdf => self.import_pdf(file_name, content).await?,
            ImportKind::Html | ImportKind::Text => {
                let raw = decode_text(content)?;
                import_text(&raw, file_name, kind == ImportKind::Html)?
            }
        };

        info!("Imported {} from {:?}", file_name, imported.source);
        Ok(imported)
    }

    async fn import_pdf(&self, file_name: &str, content: &[u8]) -> crate::Result<Imported> {
        if let Ok(text) = extract_pdf_text(content) {
            if let Some(invoice) = extract_embedded_invoice(&text) {
                self.sink.record("Embedded invoice payload found in PDF", file_name);
                return Ok(Imported {
                    invoice,
                    source: ImportSource::EmbeddedPayload,
                });
            }
        }

        let extraction = self.orchestrator.extract_document(content, file_name).await?;
        Ok(Imported {
            invoice: extraction.invoice,
            source: extraction.source.into(),
        })
    }

    /// Build a record from a natural-language request, filling missing
    /// company fields from the saved profile.
    pub async fn import_prompt(&self, prompt: &str, today: NaiveDate) -> crate::Result<Imported> {
        let extraction = self.orchestrator.extract_prompt(prompt, today).await?;
        let mut invoice = extraction.invoice;
        apply_company_fallback(&mut invoice, &self.company, "chat template", self.sink.as_ref());

        Ok(Imported {
            invoice,
            source: extraction.source.into(),
        })
    }
}

fn decode_text(content: &[u8]) -> Result<String, ImportError> {
    String::from_utf8(content.to_vec())
        .map(|text| text.trim_start_matches('\u{feff}').to_string())
        .map_err(|e| ImportError::Unreadable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InvgetError, RemoteError};
    use crate::extract::diagnostics::DiagnosticLog;
    use crate::extract::orchestrator::ExtractionSettings;
    use crate::models::invoice::DocumentType;
    use crate::payload::encode_payload;
    use crate::remote::client::CompletionRequest;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct OfflineClient;

    #[async_trait]
    impl CompletionClient for OfflineClient {
        async fn generate(&self, _request: &CompletionRequest) -> Result<Value, RemoteError> {
            Err(RemoteError::Network("offline".to_string()))
        }
    }

    fn importer(company: CompanyProfile) -> Importer<OfflineClient> {
        let sink: Arc<dyn DiagnosticSink> = Arc::new(DiagnosticLog::default());
        let settings = ExtractionSettings {
            api_key: "key".to_string(),
            model: "model-a".to_string(),
            fallback_models: Vec::new(),
            chat_max_chars: 1000,
        };
        Importer::new(Orchestrator::new(OfflineClient, settings, sink.clone()), company, sink)
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(ImportKind::detect("saved.JSON", "", b"{}"), ImportKind::Json);
        assert_eq!(ImportKind::detect("upload", "application/json", b"{}"), ImportKind::Json);
        assert_eq!(ImportKind::detect("scan.pdf", "", b""), ImportKind::Pdf);
        assert_eq!(ImportKind::detect("download", "", b"%PDF-1.7\n"), ImportKind::Pdf);
        assert_eq!(ImportKind::detect("page.htm", "", b"text"), ImportKind::Html);
        assert_eq!(ImportKind::detect("mail.txt", "", b"<p>ACME</p>"), ImportKind::Html);
        assert_eq!(ImportKind::detect("notes.txt", "text/plain", b"ACME"), ImportKind::Text);
    }

    #[test]
    fn test_import_json_errors() {
        assert_eq!(import_json("{not json"), Err(ImportError::InvalidJson));
        assert_eq!(import_json(r#"{"hello": "world"}"#), Err(ImportError::NoInvoiceData));
        assert_eq!(
            import_json(r#"{"data": {"companyName": "", "items": []}}"#),
            Err(ImportError::UnrecognizedJson)
        );
    }

    #[test]
    fn test_import_wrapped_json() {
        let invoice = import_json(
            r#"{"templates": [{"invoice": {"documentType": "bid", "clientName": "Jane", "lineItems": [{"qty": 2, "price": "$40"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(invoice.document_type, DocumentType::Bid);
        assert_eq!(invoice.client_name, "Jane");
        assert_eq!(invoice.items[0].amount(), rust_decimal::Decimal::new(80, 0));
    }

    #[test]
    fn test_import_json_with_huge_amounts() {
        let invoice = import_json(
            r#"{"items":[{"description":"x","quantity":10000000000000000000,"rate":10000000000000000000}]}"#,
        )
        .unwrap();
        assert_eq!(invoice.totals().total, rust_decimal::Decimal::MAX);
    }

    #[test]
    fn test_import_text_and_html() {
        assert_eq!(import_text(" \n ", "empty.txt", false), Err(ImportError::EmptyFile));

        let imported = import_text(
            "<div>ACME LLC</div><div>Bill To</div><div>Jane Doe</div>",
            "page.html",
            true,
        )
        .unwrap();
        assert_eq!(imported.source, ImportSource::LocalParser);
        assert_eq!(imported.invoice.company_name, "ACME LLC");
        assert_eq!(imported.invoice.client_name, "Jane Doe");
    }

    #[test]
    fn test_embedded_payload_wins() {
        let original = Invoice {
            company_name: "Payload Co".to_string(),
            ..Invoice::default()
        };
        let text = format!("Some Other Co\nBill To\nNobody\n{}", encode_payload(&original).unwrap());

        let imported = import_text(&text, "copy.txt", false).unwrap();
        assert_eq!(imported.source, ImportSource::EmbeddedPayload);
        assert_eq!(imported.invoice.company_name, "Payload Co");
    }

    #[tokio::test]
    async fn test_import_file_routes_json() {
        let imported = importer(CompanyProfile::default())
            .import_file("saved.json", "", br#"{"companyName": "ACME LLC"}"#)
            .await
            .unwrap();
        assert_eq!(imported.source, ImportSource::Json);
        assert_eq!(imported.invoice.company_name, "ACME LLC");
    }

    #[tokio::test]
    async fn test_import_file_rejects_bad_input() {
        let importer = importer(CompanyProfile::default());

        let err = importer.import_file("empty.txt", "", b"").await.unwrap_err();
        assert!(matches!(err, InvgetError::Import(ImportError::EmptyFile)));

        let err = importer.import_file("bin.txt", "", &[0xff, 0xfe, 0x41]).await.unwrap_err();
        assert!(matches!(err, InvgetError::Import(ImportError::Unreadable(_))));

        let err = importer.import_file("scan.pdf", "", b"%PDF-broken").await.unwrap_err();
        assert!(matches!(err, InvgetError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_prompt_applies_company_fallback() {
        let company = CompanyProfile {
            company_name: "Saved Co".to_string(),
            company_details: "1 Main St\nAustin, TX 78701".to_string(),
        };
        let imported = importer(company)
            .import_prompt("Invoice\nBill To: Jane Doe", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .await
            .unwrap();

        assert_eq!(imported.source, ImportSource::LocalParser);
        assert_eq!(imported.invoice.client_name, "Jane Doe");
        assert_eq!(imported.invoice.company_name, "Saved Co");
        assert_eq!(imported.invoice.company_details, "1 Main St\nAustin, TX 78701");
    }
}
