//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;
use crate::normalize::normalize_space;

/// PDF text extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Text content of a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Non-empty, whitespace-normalized lines of all pages.
    pub text: String,
    /// Pages with their content.
    pub pages: Vec<PdfPage>,
}

impl PdfContent {
    /// True when any page carries selectable text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Content from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Extract the text of every page.
    ///
    /// Pages that fail to decode are kept with empty text.
    pub fn extract_all(&self) -> Result<PdfContent> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let mut pages = Vec::with_capacity(page_count as usize);
        for number in 1..=page_count {
            let text = self.extract_page_text(number).unwrap_or_else(|e| {
                warn!("Failed to read text of page {}: {}", number, e);
                String::new()
            });
            pages.push(PdfPage { number, text });
        }

        let mut text = clean_lines(pages.iter().map(|page| page.text.as_str()));

        // lopdf misses text in some font encodings that pdf-extract handles
        if text.is_empty() {
            text = clean_lines(std::iter::once(self.extract_text().unwrap_or_default().as_str()));
        }

        debug!("PDF text: {} pages, {} chars", page_count, text.len());
        Ok(PdfContent { text, pages })
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `data`, unlocking empty-password encryption.
///
/// Returns the document together with the bytes pdf-extract should read,
/// which are re-serialized when the input was encrypted.
fn open_document(data: &[u8]) -> Result<(Document, Vec<u8>)> {
    let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;
    if !doc.is_encrypted() {
        return Ok((doc, data.to_vec()));
    }

    doc.decrypt("").map_err(|_| PdfError::Encrypted)?;
    let mut unlocked = Vec::new();
    doc.save_to(&mut unlocked)
        .map_err(|e| PdfError::Parse(format!("could not re-save unlocked PDF: {e}")))?;
    debug!("Unlocked PDF with an empty password ({} bytes)", unlocked.len());
    Ok((doc, unlocked))
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let (doc, bytes) = open_document(data)?;
        let pages = doc.get_pages().len();
        if pages == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF: {} pages", pages);
        self.document = Some(doc);
        self.raw_data = bytes;
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))?;
        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

/// Whitespace-normalized, non-empty lines of every chunk, newline joined.
fn clean_lines<'a>(chunks: impl Iterator<Item = &'a str>) -> String {
    chunks
        .flat_map(str::lines)
        .map(normalize_space)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load `data` and return its text layer, or an empty string when the PDF
/// has no selectable text.
pub fn extract_pdf_text(data: &[u8]) -> Result<String> {
    let mut extractor = PdfExtractor::new();
    extractor.load(data)?;
    Ok(extractor.extract_all()?.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn single_page_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_text().is_err());
    }

    #[test]
    fn test_load_generated_pdf() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&single_page_pdf("ACME LLC")).unwrap();
        assert_eq!(extractor.page_count(), 1);

        let content = extractor.extract_all().unwrap();
        assert_eq!(content.pages.len(), 1);
        assert_eq!(content.pages[0].number, 1);
    }

    #[test]
    fn test_clean_lines() {
        let text = clean_lines(["  ACME   LLC \n\n", "", "Bill To\r\n Jane  Doe"].into_iter());
        assert_eq!(text, "ACME LLC\nBill To\nJane Doe");
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.load(b"definitely not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}
