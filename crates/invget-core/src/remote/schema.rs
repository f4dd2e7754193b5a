//! JSON schema constraining remote model responses.

use serde_json::{json, Value};

const ADDRESS_BLOCK_HINT: &str = "Address block format: line 1 street number + street name, line 2 city + state + ZIP, line 3 phone (if present)";

/// Schema for the canonical record. Every field is required and no extra
/// properties are allowed.
pub fn invoice_response_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "documentType",
            "companyName",
            "companyDetails",
            "invoiceDate",
            "clientName",
            "clientDetails",
            "items",
            "taxRate",
            "discountType",
            "discountValue",
            "notes"
        ],
        "properties": {
            "documentType": { "type": "string", "enum": ["Invoice", "Bid"] },
            "companyName": { "type": "string" },
            "companyDetails": { "type": "string", "description": ADDRESS_BLOCK_HINT },
            "invoiceDate": {
                "type": "string",
                "description": "Use YYYY-MM-DD if known, otherwise empty string"
            },
            "clientName": { "type": "string" },
            "clientDetails": { "type": "string", "description": ADDRESS_BLOCK_HINT },
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["description", "address", "work", "quantity", "rate"],
                    "properties": {
                        "description": { "type": "string" },
                        "address": {
                            "type": "string",
                            "description": "Property address block: line 1 street number + street name, line 2 city + state + ZIP"
                        },
                        "work": { "type": "string" },
                        "quantity": { "type": "number" },
                        "rate": { "type": "number" }
                    }
                }
            },
            "taxRate": { "type": "number" },
            "discountType": { "type": "string", "enum": ["fixed", "percentage"] },
            "discountValue": { "type": "number" },
            "notes": { "type": "string" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_matches_properties() {
        let schema = invoice_response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        let properties = schema["properties"].as_object().unwrap();

        assert_eq!(required.len(), properties.len());
        assert!(required.iter().all(|key| properties.contains_key(*key)));
        assert_eq!(schema["additionalProperties"], false);
    }
}
