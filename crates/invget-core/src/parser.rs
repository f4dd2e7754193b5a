//! Heuristic invoice parser for flattened document text.
//!
//! The text is split into trimmed, non-empty lines and segmented by anchor
//! lines ("Bill To", "Date", the item table header, totals and notes). Each
//! section is read on its own and the assembled record is canonicalized.

use std::time::Instant;

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info};

use crate::canonical::{canonicalize_invoice, normalize_line_item};
use crate::models::invoice::{DiscountType, Invoice, LineItem};
use crate::normalize::patterns::{
    ANCHOR_REMAINDER, BILL_TO_ANCHOR, DATE_LABEL, DATE_LINE, DESCRIPTION_WORD, DISCOUNT_LINE,
    DOC_TYPE_LINE, ITEM_HEADER_WORD, ITEM_ROW_COMPACT, ITEM_ROW_FULL, MONEY_TOKEN, NOTES_LINE,
    NOTES_REMAINDER, PERCENT_VALUE, QTY_WORD, TAX_LINE, TOTALS_LINE,
};
use crate::normalize::{
    find_date_token, infer_document_type, normalize_space, to_currency_number, to_iso_date,
    to_number,
};

/// Result of parsing one document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Canonical record.
    pub invoice: Invoice,
    /// Sections that could not be recognized.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for text-to-invoice parsers.
pub trait InvoiceParser {
    /// Parse flattened document text. `source_name` is the file name or
    /// label the text came from and takes part in document type inference.
    fn parse(&self, text: &str, source_name: &str) -> ExtractionResult;
}

/// Anchor-line parser for plain invoice and bid text.
#[derive(Debug, Clone)]
pub struct HeuristicInvoiceParser {
    /// Company lines taken when no anchor bounds the company section.
    company_line_cap: usize,
    /// Client lines taken when no anchor bounds the client section.
    client_line_cap: usize,
}

impl HeuristicInvoiceParser {
    /// Create a parser with the default section caps.
    pub fn new() -> Self {
        Self {
            company_line_cap: 4,
            client_line_cap: 6,
        }
    }

    /// Set the unbounded company section cap.
    pub fn with_company_line_cap(mut self, cap: usize) -> Self {
        self.company_line_cap = cap;
        self
    }

    /// Set the unbounded client section cap.
    pub fn with_client_line_cap(mut self, cap: usize) -> Self {
        self.client_line_cap = cap;
        self
    }

    fn company_section(&self, lines: &[String]) -> (String, String) {
        let end = [
            find_line(lines, |line| BILL_TO_ANCHOR.is_match(line)),
            find_line(lines, |line| DATE_LINE.is_match(line)),
            find_item_header(lines),
            find_line(lines, |line| DOC_TYPE_LINE.is_match(line)),
        ]
        .into_iter()
        .flatten()
        .filter(|&index| index > 0)
        .min()
        .unwrap_or_else(|| lines.len().min(self.company_line_cap));

        let section: Vec<&str> = lines[..end]
            .iter()
            .map(String::as_str)
            .filter(|line| !DATE_LINE.is_match(line) && !DOC_TYPE_LINE.is_match(line))
            .collect();

        split_name_and_details(&section)
    }

    fn client_section(&self, lines: &[String]) -> (String, String) {
        let Some(anchor) = find_line(lines, |line| BILL_TO_ANCHOR.is_match(line)) else {
            return (String::new(), String::new());
        };

        let after_anchor = |predicate: fn(&str) -> bool| {
            lines
                .iter()
                .enumerate()
                .skip(anchor + 1)
                .find(|(_, line)| predicate(line.as_str()))
                .map(|(index, _)| index)
        };
        let end = [
            find_item_header(lines),
            after_anchor(|line| TOTALS_LINE.is_match(line)),
            after_anchor(|line| NOTES_LINE.is_match(line)),
        ]
        .into_iter()
        .flatten()
        .filter(|&index| index > anchor)
        .min()
        .unwrap_or_else(|| lines.len().min(anchor + self.client_line_cap));

        let mut section: Vec<&str> = Vec::new();
        if let Some(caps) = ANCHOR_REMAINDER.captures(&lines[anchor]) {
            if let Some(remainder) = caps.get(1) {
                section.push(remainder.as_str());
            }
        }
        section.extend(
            lines[anchor + 1..end.max(anchor + 1)]
                .iter()
                .map(String::as_str)
                .filter(|line| !DATE_LINE.is_match(line) && !ITEM_HEADER_WORD.is_match(line)),
        );

        split_name_and_details(&section)
    }
}

impl Default for HeuristicInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for HeuristicInvoiceParser {
    fn parse(&self, text: &str, source_name: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let lines = split_lines(text);
        info!("Parsing {} lines of text from '{}'", lines.len(), source_name);

        let mut invoice = Invoice {
            document_type: infer_document_type(&format!("{source_name}\n{}", lines.join("\n"))),
            ..Invoice::default()
        };

        invoice.invoice_date = find_invoice_date(&lines);
        if invoice.invoice_date.is_empty() {
            warnings.push("Could not find an invoice date".to_string());
        }

        let (company_name, company_details) = self.company_section(&lines);
        invoice.company_name = company_name;
        invoice.company_details = company_details;

        let (client_name, client_details) = self.client_section(&lines);
        if client_name.is_empty() {
            warnings.push("Could not find a client section".to_string());
        }
        invoice.client_name = client_name;
        invoice.client_details = client_details;

        let items = parse_items(&lines);
        debug!("Recognized {} line items", items.len());
        if items.is_empty() {
            warnings.push("No line items recognized".to_string());
        } else {
            invoice.items = items;
        }

        let totals = parse_totals(&lines);
        invoice.tax_rate = totals.tax_rate;
        invoice.discount_type = totals.discount_type;
        invoice.discount_value = totals.discount_value;
        invoice.notes = extract_notes(&lines);

        let invoice = canonicalize_invoice(&invoice);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Parsed {} with {} items in {}ms",
            invoice.document_type,
            invoice.items.len(),
            processing_time_ms
        );

        ExtractionResult {
            invoice,
            warnings,
            processing_time_ms,
        }
    }
}

/// Parse text with the default parser and return only the record.
pub fn parse_invoice_text(text: &str, source_name: &str) -> Invoice {
    HeuristicInvoiceParser::new().parse(text, source_name).invoice
}

/// Split raw text into whitespace-normalized, non-empty lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split(['\r', '\n'])
        .map(normalize_space)
        .filter(|line| !line.is_empty())
        .collect()
}

fn find_line(lines: &[String], predicate: impl Fn(&str) -> bool) -> Option<usize> {
    lines.iter().position(|line| predicate(line))
}

fn find_item_header(lines: &[String]) -> Option<usize> {
    find_line(lines, is_item_header)
}

fn is_item_header(line: &str) -> bool {
    DESCRIPTION_WORD.is_match(line) && QTY_WORD.is_match(line)
}

fn is_section_end(line: &str) -> bool {
    TOTALS_LINE.is_match(line) || NOTES_LINE.is_match(line)
}

fn split_name_and_details(section: &[&str]) -> (String, String) {
    match section.split_first() {
        Some((name, details)) => (name.to_string(), details.join("\n")),
        None => (String::new(), String::new()),
    }
}

fn date_from(text: &str) -> String {
    let token = find_date_token(text);
    if token.is_empty() {
        to_iso_date(text)
    } else {
        token
    }
}

/// Anchored date first, then the first date token anywhere.
fn find_invoice_date(lines: &[String]) -> String {
    for (index, line) in lines.iter().enumerate() {
        if !DATE_LINE.is_match(line) {
            continue;
        }

        let remainder = DATE_LABEL
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map_or("", |m| m.as_str());
        let direct = date_from(remainder);
        if !direct.is_empty() {
            return direct;
        }

        if let Some(next) = lines.get(index + 1) {
            let next_date = date_from(next);
            if !next_date.is_empty() {
                return next_date;
            }
        }
    }

    lines
        .iter()
        .map(|line| find_date_token(line))
        .find(|date| !date.is_empty())
        .unwrap_or_default()
}

fn buffered_item(buffer: &mut Vec<String>, fragment: &str) -> Option<LineItem> {
    let mut parts = std::mem::take(buffer);
    parts.push(fragment.to_string());
    let raw = parts.join("\n").trim().to_string();
    if raw.is_empty() {
        return None;
    }
    Some(normalize_line_item(&json!({ "description": raw })))
}

/// Read item rows after the table header (or from the top when there is
/// none) until the totals or notes section.
fn parse_items(lines: &[String]) -> Vec<LineItem> {
    let start = find_item_header(lines).map_or(0, |header| header + 1);
    let mut items = Vec::new();
    let mut buffer: Vec<String> = Vec::new();

    for line in &lines[start..] {
        if is_section_end(line) {
            break;
        }
        if ITEM_HEADER_WORD.is_match(line) {
            continue;
        }

        let row = ITEM_ROW_FULL.captures(line).or_else(|| {
            if buffer.is_empty() {
                None
            } else {
                ITEM_ROW_COMPACT.captures(line)
            }
        });

        match row {
            Some(caps) => {
                let fragment = &caps[1];
                let mut item = buffered_item(&mut buffer, fragment)
                    .unwrap_or_else(|| normalize_line_item(&json!({ "description": fragment })));
                item.quantity = to_number(&caps[2], Decimal::ZERO).max(Decimal::ZERO);
                item.rate = to_currency_number(&caps[3], Decimal::ZERO).max(Decimal::ZERO);
                items.push(item);
            }
            None => buffer.push(line.clone()),
        }
    }

    if !buffer.is_empty() {
        if let Some(item) = buffered_item(&mut buffer, "") {
            items.push(item);
        }
    }

    items
        .into_iter()
        .filter(|item| {
            !item.address.is_empty()
                || !item.work.is_empty()
                || !item.description.is_empty()
                || !item.quantity.is_zero()
                || !item.rate.is_zero()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct Totals {
    tax_rate: Decimal,
    discount_type: DiscountType,
    discount_value: Decimal,
}

fn parse_totals(lines: &[String]) -> Totals {
    let mut totals = Totals {
        tax_rate: Decimal::ZERO,
        discount_type: DiscountType::Fixed,
        discount_value: Decimal::ZERO,
    };

    for line in lines {
        if TAX_LINE.is_match(line) {
            if let Some(caps) = PERCENT_VALUE.captures(line) {
                totals.tax_rate = to_number(&caps[1], Decimal::ZERO).max(Decimal::ZERO);
            }
        }

        if DISCOUNT_LINE.is_match(line) {
            if let Some(caps) = PERCENT_VALUE.captures(line) {
                totals.discount_type = DiscountType::Percentage;
                totals.discount_value = to_number(&caps[1], Decimal::ZERO).max(Decimal::ZERO);
                continue;
            }

            if let Some(last) = MONEY_TOKEN.find_iter(line).last() {
                totals.discount_type = DiscountType::Fixed;
                totals.discount_value = to_currency_number(last.as_str(), Decimal::ZERO).abs();
            }
        }
    }

    totals
}

/// Everything after the notes anchor, including text on the anchor line.
fn extract_notes(lines: &[String]) -> String {
    let Some(anchor) = find_line(lines, |line| NOTES_LINE.is_match(line)) else {
        return String::new();
    };

    let inline = NOTES_REMAINDER
        .captures(&lines[anchor])
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    inline
        .into_iter()
        .chain(lines[anchor + 1..].iter().cloned())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
