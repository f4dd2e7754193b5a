//! North American phone number detection and formatting.

use std::ops::Range;

use super::normalize_space;
use super::patterns::{PHONE_EXTENSION, PHONE_NUMBER};

/// A phone number found inside a larger block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneMatch {
    /// Byte range of the match in the searched text.
    pub span: Range<usize>,
    /// Matched text with whitespace collapsed.
    pub raw: String,
}

/// Find the first phone-shaped token in `text`.
pub fn extract_phone(text: &str) -> Option<PhoneMatch> {
    PHONE_NUMBER.find(text).map(|found| PhoneMatch {
        span: found.range(),
        raw: normalize_space(found.as_str()),
    })
}

/// Format a phone number as `(NNN) NNN-NNNN`, keeping any extension as ` xEXT`.
///
/// A leading country digit `1` is dropped. Input that does not reduce to ten
/// digits is returned unchanged.
pub fn format_phone(value: &str) -> String {
    let raw = normalize_space(value);
    if raw.is_empty() {
        return raw;
    }

    let (number, extension) = match PHONE_EXTENSION.captures(&raw) {
        Some(caps) => {
            let start = caps.get(0).map_or(raw.len(), |m| m.start());
            (&raw[..start], caps.get(1).map(|m| m.as_str()))
        }
        None => (raw.as_str(), None),
    };

    let mut digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits.remove(0);
    }
    if digits.len() != 10 {
        return raw;
    }

    let formatted = format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]);
    match extension {
        Some(ext) => format!("{formatted} x{ext}"),
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("1-800-555-1234"), "(800) 555-1234");
        assert_eq!(format_phone("555.123.4567"), "(555) 123-4567");
        assert_eq!(format_phone("+1 (555) 123 4567 ext. 42"), "(555) 123-4567 x42");
        assert_eq!(format_phone("(555) 123-4567"), "(555) 123-4567");
    }

    #[test]
    fn test_short_numbers_unchanged() {
        assert_eq!(format_phone("12345"), "12345");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn test_extract_phone() {
        let text = "123 Main St\nPhone: 555-123-4567\nSpringfield";
        let found = extract_phone(text).unwrap();
        assert_eq!(found.raw, "555-123-4567");
        assert_eq!(&text[found.span], "555-123-4567");

        assert!(extract_phone("Springfield, IL 62704").is_none());
    }
}
