//! Self-describing invoice payload embedded in generated documents.
//!
//! The canonical record is serialized to JSON, encoded as URL-safe base64
//! without padding and split into numbered fixed-width chunks between two
//! marker lines:
//!
//! ```text
//! INVGET_PAYLOAD_BEGIN
//! INVGET_PAYLOAD_CHUNK_001:eyJkb2N1bWVudFR5cGUiOiJJbnZvaWNlIiwi...
//! INVGET_PAYLOAD_CHUNK_002:...
//! INVGET_PAYLOAD_END
//! ```
//!
//! Text extraction may reorder or re-wrap these lines, so decoding sorts the
//! chunks by index and ignores anything that is not base64.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::canonical::{canonicalize, canonicalize_invoice};
use crate::locator::locate_invoice;
use crate::models::invoice::Invoice;
use crate::normalize::normalize_space;

pub const PAYLOAD_BEGIN: &str = "INVGET_PAYLOAD_BEGIN";
pub const PAYLOAD_END: &str = "INVGET_PAYLOAD_END";
pub const CHUNK_PREFIX: &str = "INVGET_PAYLOAD_CHUNK_";

/// Characters per chunk line.
pub const CHUNK_WIDTH: usize = 180;

lazy_static! {
    static ref CHUNK_LINE: Regex =
        Regex::new(r"^INVGET_PAYLOAD_CHUNK_(\d{3})\s*:\s*([A-Za-z0-9_\-\s]+)$").unwrap();
    static ref NON_BASE64: Regex = Regex::new(r"[^A-Za-z0-9_\-]").unwrap();
}

/// Encode a record as a payload block. The record is canonicalized first.
pub fn encode_payload(invoice: &Invoice) -> crate::Result<String> {
    let json = serde_json::to_string(&canonicalize_invoice(invoice))?;
    let encoded = BASE64.encode(json.as_bytes());

    let mut lines = vec![PAYLOAD_BEGIN.to_string()];
    // base64 output is ASCII, so byte chunks are char boundaries
    for (index, chunk) in encoded.as_bytes().chunks(CHUNK_WIDTH).enumerate() {
        let chunk = std::str::from_utf8(chunk).unwrap_or_default();
        lines.push(format!("{CHUNK_PREFIX}{:03}:{chunk}", index + 1));
    }
    lines.push(PAYLOAD_END.to_string());

    debug!("Encoded payload into {} chunks", lines.len() - 2);
    Ok(lines.join("\n"))
}

/// Find and decode the JSON carried by a payload block inside `text`.
pub fn decode_payload_json(text: &str) -> Option<Value> {
    let start = text.find(PAYLOAD_BEGIN)?;
    let end = start + text[start..].find(PAYLOAD_END)?;
    let block = &text[start..end];

    let mut chunks: Vec<(u32, String)> = block
        .lines()
        .map(normalize_space)
        .filter_map(|line| {
            let caps = CHUNK_LINE.captures(&line)?;
            let order: u32 = caps[1].parse().ok()?;
            let chunk = NON_BASE64.replace_all(&caps[2], "").into_owned();
            (!chunk.is_empty()).then_some((order, chunk))
        })
        .collect();
    if chunks.is_empty() {
        return None;
    }

    chunks.sort_by_key(|(order, _)| *order);
    let joined: String = chunks.into_iter().map(|(_, chunk)| chunk).collect();

    let bytes = match BASE64.decode(joined.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to decode embedded payload: {}", e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Embedded payload is not valid JSON: {}", e);
            None
        }
    }
}

/// Recover the canonical record from a payload block inside `text`.
pub fn extract_embedded_invoice(text: &str) -> Option<Invoice> {
    let payload = decode_payload_json(text)?;
    let candidate = locate_invoice(&payload)?;
    Some(canonicalize(candidate))
}
