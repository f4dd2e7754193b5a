//! Locating the invoice-shaped object inside arbitrary JSON.
//!
//! Saved templates, model responses and exported records wrap the record at
//! varying depths (`{"data": {"invoice": {...}}}`, `[{...}]`, ...). The search
//! is depth-first and bounded.

use serde_json::Value;

/// Deepest nesting level that is searched.
pub const MAX_DEPTH: usize = 3;

const ITEM_COLLECTION_KEYS: [&str; 3] = ["items", "lineItems", "services"];

const HINT_KEYS: [&str; 7] = [
    "companyName",
    "clientName",
    "invoiceDate",
    "documentType",
    "taxRate",
    "discountValue",
    "notes",
];

const PREFERRED_KEYS: [&str; 8] = [
    "data", "invoice", "bid", "document", "template", "templates", "records", "payload",
];

/// True when `candidate` is a mapping with an item collection or a hint key.
pub fn is_invoice_candidate(candidate: &Value) -> bool {
    let Value::Object(map) = candidate else {
        return false;
    };

    ITEM_COLLECTION_KEYS
        .iter()
        .any(|key| map.get(*key).is_some_and(Value::is_array))
        || HINT_KEYS.iter().any(|key| map.contains_key(*key))
}

/// Find the first invoice-shaped object in `payload`.
///
/// Sequences are searched element by element. Mappings are searched through
/// the preferred wrapper keys first, then through their remaining values in
/// order. Nothing deeper than [`MAX_DEPTH`] is examined.
pub fn locate_invoice(payload: &Value) -> Option<&Value> {
    locate_at(payload, 0)
}

fn locate_at(payload: &Value, depth: usize) -> Option<&Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    if is_invoice_candidate(payload) {
        return Some(payload);
    }

    match payload {
        Value::Array(entries) => entries.iter().find_map(|entry| locate_at(entry, depth + 1)),
        Value::Object(map) => PREFERRED_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|value| locate_at(value, depth + 1))
            .or_else(|| {
                map.iter()
                    .filter(|(key, value)| {
                        !PREFERRED_KEYS.contains(&key.as_str())
                            && (value.is_object() || value.is_array())
                    })
                    .find_map(|(_, value)| locate_at(value, depth + 1))
            }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_candidate() {
        let payload = json!({"companyName": "ACME LLC"});
        assert_eq!(locate_invoice(&payload), Some(&payload));

        let payload = json!({"services": []});
        assert_eq!(locate_invoice(&payload), Some(&payload));
    }

    #[test]
    fn test_items_must_be_a_sequence() {
        assert!(!is_invoice_candidate(&json!({"items": "none"})));
        assert!(!is_invoice_candidate(&json!([{"companyName": "x"}])));
    }

    #[test]
    fn test_preferred_wrapper() {
        let payload = json!({"meta": {"version": 2}, "data": {"invoice": {"clientName": "Jane"}}});
        assert_eq!(locate_invoice(&payload), Some(&json!({"clientName": "Jane"})));
    }

    #[test]
    fn test_preferred_keys_before_other_values() {
        let payload = json!({
            "other": {"clientName": "From other"},
            "payload": {"clientName": "From payload"}
        });
        assert_eq!(locate_invoice(&payload).unwrap()["clientName"], "From payload");
    }

    #[test]
    fn test_sequence_of_records() {
        let payload = json!({"templates": [{"name": "blank"}, {"items": [{"rate": 5}]}]});
        assert_eq!(locate_invoice(&payload), Some(&json!({"items": [{"rate": 5}]})));
    }

    #[test]
    fn test_depth_bound() {
        let at_three = json!({"a": {"b": {"c": {"notes": "deep"}}}});
        assert!(locate_invoice(&at_three).is_some());

        let at_four = json!({"a": {"b": {"c": {"d": {"notes": "too deep"}}}}});
        assert!(locate_invoice(&at_four).is_none());
    }

    #[test]
    fn test_scalars() {
        assert!(locate_invoice(&json!("invoice")).is_none());
        assert!(locate_invoice(&Value::Null).is_none());
    }
}
