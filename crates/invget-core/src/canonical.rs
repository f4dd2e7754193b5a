//! Canonicalization of loosely shaped records into [`Invoice`].
//!
//! Input may come from a saved template, a model response, an embedded
//! payload or the heuristic parser. Field names are resolved through alias
//! chains, every value is coerced, and the result always satisfies the record
//! invariants: a known document type, non-negative numbers, an ISO or empty
//! date and at least one line item.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::extract::diagnostics::DiagnosticSink;
use crate::models::config::CompanyProfile;
use crate::models::invoice::{DiscountType, Invoice, LineItem};
use crate::normalize::{
    infer_document_type, normalize_address, split_description, to_iso_date, value_to_currency,
    value_to_number,
};

/// Canonicalize an arbitrary JSON value. Non-objects yield the default record.
pub fn canonicalize(source: &Value) -> Invoice {
    let empty = Map::new();
    let map = source.as_object().unwrap_or(&empty);
    let mut invoice = Invoice::default();

    let document_type = first_text(map, &["documentType", "type", "docType"]);
    invoice.document_type = infer_document_type(&document_type);

    invoice.company_name = first_text(map, &["companyName", "fromName", "businessName", "vendorName"])
        .trim()
        .to_string();
    invoice.company_details = normalize_address(
        &first_text(map, &["companyDetails", "fromDetails", "businessDetails", "vendorDetails"]),
        true,
    );
    invoice.client_name = first_text(map, &["clientName", "customerName", "billToName"])
        .trim()
        .to_string();
    invoice.client_details = normalize_address(
        &first_text(map, &["clientDetails", "customerDetails", "billToDetails"]),
        true,
    );
    invoice.logo = match map.get("logo") {
        Some(Value::String(logo)) if !logo.is_empty() => Some(logo.clone()),
        _ => None,
    };
    invoice.notes = first_text(map, &["notes", "note", "terms"]).trim().to_string();
    invoice.invoice_date =
        to_iso_date(&first_text(map, &["invoiceDate", "date", "issueDate", "createdAt"]));

    invoice.tax_rate = first_present(map, &["taxRate", "tax", "vatRate"])
        .map_or(Decimal::ZERO, |value| value_to_number(value, Decimal::ZERO))
        .max(Decimal::ZERO);

    let discount_type = first_text(map, &["discountType"]).to_lowercase();
    invoice.discount_type = match discount_type.as_str() {
        "percentage" | "percent" | "%" => DiscountType::Percentage,
        _ => DiscountType::Fixed,
    };
    invoice.discount_value = first_present(map, &["discountValue", "discount"])
        .map_or(Decimal::ZERO, |value| value_to_currency(value, Decimal::ZERO))
        .max(Decimal::ZERO);

    let items: Vec<LineItem> = ["items", "lineItems", "services"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))
        .map(|entries| {
            entries
                .iter()
                .map(normalize_line_item)
                .filter(is_retained)
                .collect()
        })
        .unwrap_or_default();
    if !items.is_empty() {
        invoice.items = items;
    }

    invoice
}

/// Re-run canonicalization over an existing record.
///
/// Text fields go through the same coercion as [`canonicalize`]. Numbers are
/// taken from the record itself and only clamped, since the JSON form of a
/// `Decimal` is an `f64` and would drop digits.
pub fn canonicalize_invoice(invoice: &Invoice) -> Invoice {
    let Ok(value) = serde_json::to_value(invoice) else {
        return invoice.clone();
    };
    let mut canonical = canonicalize(&value);
    canonical.tax_rate = invoice.tax_rate.max(Decimal::ZERO);
    canonical.discount_value = invoice.discount_value.max(Decimal::ZERO);

    let items: Vec<LineItem> = invoice
        .items
        .iter()
        .filter_map(|item| {
            let mut normalized = normalize_line_item(&serde_json::to_value(item).ok()?);
            normalized.quantity = item.quantity.max(Decimal::ZERO);
            normalized.rate = item.rate.max(Decimal::ZERO);
            Some(normalized)
        })
        .filter(is_retained)
        .collect();
    canonical.items = if items.is_empty() {
        vec![LineItem::default()]
    } else {
        items
    };
    canonical
}

/// Normalize one line item.
///
/// Missing address or work is recovered from the description; the stored
/// description is always rebuilt as address and work on separate lines.
pub fn normalize_line_item(source: &Value) -> LineItem {
    let owned;
    let map = match source {
        Value::Object(map) => map,
        Value::String(text) => {
            let mut map = Map::new();
            map.insert("description".to_string(), Value::String(text.clone()));
            owned = map;
            &owned
        }
        _ => {
            owned = Map::new();
            &owned
        }
    };

    let mut address = normalize_address(&first_text(map, &["address", "propertyAddress"]), false);
    let mut work = first_text(map, &["work", "workDone"]).trim().to_string();
    let raw_description = first_text(map, &["description", "item"]).trim().to_string();

    if !raw_description.is_empty() {
        if address.is_empty() && work.is_empty() {
            let parts = split_description(&raw_description);
            address = normalize_address(&parts.address, false);
            work = parts.work;
        } else if address.is_empty() {
            address = match raw_description.strip_suffix(work.as_str()) {
                Some(prefix) => normalize_address(prefix, false),
                None => normalize_address(&split_description(&raw_description).address, false),
            };
        } else if work.is_empty() {
            work = match raw_description.strip_prefix(address.as_str()) {
                Some(rest) => rest.trim().to_string(),
                None => split_description(&raw_description).work,
            };
        }
    }

    let description = if address.is_empty() && work.is_empty() {
        raw_description
    } else {
        [address.as_str(), work.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    };

    let quantity = first_present(map, &["quantity", "qty", "hours", "units"])
        .map_or(Decimal::ONE, |value| value_to_number(value, Decimal::ONE))
        .max(Decimal::ZERO);
    let rate = first_present(map, &["rate", "price", "unitPrice", "amount"])
        .map_or(Decimal::ZERO, |value| value_to_currency(value, Decimal::ZERO))
        .max(Decimal::ZERO);

    LineItem {
        description,
        quantity,
        rate,
        address,
        work,
    }
}

/// Lines with no text, zero quantity and zero rate are dropped.
fn is_retained(item: &LineItem) -> bool {
    !item.address.is_empty()
        || !item.work.is_empty()
        || !item.description.is_empty()
        || !item.quantity.is_zero()
        || !item.rate.is_zero()
}

/// Fill a missing company name or address from the saved profile.
///
/// Returns true when any field was filled.
pub fn apply_company_fallback(
    invoice: &mut Invoice,
    profile: &CompanyProfile,
    source_label: &str,
    sink: &dyn DiagnosticSink,
) -> bool {
    let mut filled = Vec::new();

    let profile_name = profile.company_name.trim();
    if invoice.company_name.trim().is_empty() && !profile_name.is_empty() {
        invoice.company_name = profile_name.to_string();
        filled.push("companyName");
    }

    if invoice.company_details.trim().is_empty() {
        let details = normalize_address(&profile.company_details, true);
        if !details.is_empty() {
            invoice.company_details = details;
            filled.push("companyDetails");
        }
    }

    if filled.is_empty() {
        return false;
    }

    let source = if source_label.is_empty() { "unknown" } else { source_label };
    sink.record(
        "Applied default company fallback",
        &format!("source={} filled={}", source, filled.join(",")),
    );
    true
}

/// First alias holding a non-empty text, non-zero number or `true`.
fn first_text(map: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(|value| match value {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// First alias that is present and not null.
fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}
