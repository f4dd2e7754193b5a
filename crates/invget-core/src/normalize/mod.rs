//! Field normalizers.
//!
//! Pure, total functions that coerce loosely typed values into canonical
//! shapes. None of them fail: unusable input produces a documented default.

pub mod address;
pub mod dates;
pub mod description;
pub mod doc_type;
pub mod numbers;
pub mod patterns;
pub mod phone;

pub use address::{normalize_address, normalize_locality, repair_line};
pub use dates::{find_date_token, parse_date, to_iso_date};
pub use description::{split_description, DescriptionParts};
pub use doc_type::infer_document_type;
pub use numbers::{parse_number, to_currency_number, to_number, value_to_currency, value_to_number};
pub use phone::{extract_phone, format_phone, PhoneMatch};

use patterns::WHITESPACE_RUN;

/// Collapse whitespace runs (including non-breaking spaces) and trim.
pub fn normalize_space(value: &str) -> String {
    let replaced = value.replace('\u{00A0}', " ");
    WHITESPACE_RUN.replace_all(&replaced, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_space() {
        assert_eq!(normalize_space("  ACME\u{00A0}\u{00A0}LLC \n\t Inc "), "ACME LLC Inc");
        assert_eq!(normalize_space(""), "");
    }
}
