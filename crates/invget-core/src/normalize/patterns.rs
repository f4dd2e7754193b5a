//! Regex tables shared by the normalizers and the heuristic parser.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Whitespace
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    pub static ref COMMA_SPACING: Regex = Regex::new(r"\s*,\s*").unwrap();
    pub static ref BLANK_LINE_RUN: Regex = Regex::new(r"\n{3,}").unwrap();

    // Numbers
    pub static ref NUMERIC_PREFIX: Regex = Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)").unwrap();
    pub static ref WRAPPED_NEGATIVE: Regex = Regex::new(r"^\(.*\)$").unwrap();

    // Dates
    pub static ref ORDINAL_SUFFIX: Regex = Regex::new(r"(?i)(\d+)(?:st|nd|rd|th)\b").unwrap();
    pub static ref ISO_DATE: Regex = Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap();
    pub static ref SLASH_DATE: Regex = Regex::new(
        r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})$"
    ).unwrap();
    pub static ref YMD_SLASH_DATE: Regex = Regex::new(r"^(\d{4})[/.](\d{1,2})[/.](\d{1,2})$").unwrap();
    pub static ref MONTH_DAY_YEAR: Regex = Regex::new(
        r"(?i)^(?:[a-z]+,?\s+)?([a-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})$"
    ).unwrap();
    pub static ref DAY_MONTH_YEAR: Regex = Regex::new(
        r"(?i)^(?:[a-z]+,?\s+)?(\d{1,2})\s+([a-z]{3,9})\.?,?\s+(\d{4})$"
    ).unwrap();

    // Date tokens inside free text, tried in this order.
    pub static ref ISO_DATE_TOKEN: Regex = Regex::new(r"\b\d{4}-\d{1,2}-\d{1,2}\b").unwrap();
    pub static ref SLASH_DATE_TOKEN: Regex = Regex::new(
        r"\b\d{1,2}[/.\-]\d{1,2}[/.\-](?:\d{4}|\d{2})\b"
    ).unwrap();
    pub static ref MONTH_NAME_DATE_TOKEN: Regex = Regex::new(
        r"(?i)\b(?:jan|january|feb|february|mar|march|apr|april|may|jun|june|jul|july|aug|august|sep|sept|september|oct|october|nov|november|dec|december)\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b"
    ).unwrap();

    // Phone numbers
    pub static ref PHONE_NUMBER: Regex = Regex::new(
        r"(?i)(?:\+?1[\s.\-]*)?(?:\(\d{3}\)|\d{3})[\s.\-]*\d{3}[\s.\-]*\d{4}(?:\s*(?:x|ext\.?)\s*\d+)?"
    ).unwrap();
    pub static ref PHONE_EXTENSION: Regex = Regex::new(r"(?i)\s*(?:x|ext\.?)\s*(\d+)$").unwrap();
    pub static ref PHONE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:phone|tel|telephone|mobile|cell)\b\s*[:\-]*"
    ).unwrap();

    // Address lines
    pub static ref COUNTY_ROAD_GLUE: Regex = Regex::new(
        r"(?i)(\b(?:county\s+road|county\s+rd|co\.?\s*rd|cr)\s+)([B-DF-HJ-NP-TV-Z]{3})([B-DF-HJ-NP-TV-Z][A-Z]{3,})(,\s*[A-Za-z]{2}\s+\d{5}(?:-\d{4})?\b)"
    ).unwrap();
    pub static ref STREET_SUFFIX_GLUE: Regex = Regex::new(
        r"(\S\s+(?i:st|street|rd|road|ave|avenue|blvd|boulevard|dr|drive|ln|lane|ct|court|pl|place|ter|terrace|pkwy|parkway|cir|circle|trl|trail|way|hwy|highway)\.?)([A-Z][A-Za-z.'\-]{2,},\s*[A-Za-z]{2}\s+\d{5}(?:-\d{4})?\b)"
    ).unwrap();
    pub static ref LOWER_UPPER_GLUE: Regex = Regex::new(r"([a-z0-9#.])([A-Z][a-z])").unwrap();
    pub static ref NAME_PARTICLE_END: Regex = Regex::new(
        r"(?i)(?:^|\s)(?:Mc|Mac|De|Di|La|Le|El|O')$"
    ).unwrap();
    pub static ref STREET_START: Regex = Regex::new(r"^\d+\s+").unwrap();
    pub static ref LOCALITY_HINT: Regex = Regex::new(
        r"\d{5}(?:-\d{4})?|,\s*[A-Za-z]{2}\b|\b[A-Za-z]{2}\s+\d{5}(?:-\d{4})?\b"
    ).unwrap();
    pub static ref ONE_LINE_ADDRESS: Regex = Regex::new(r"^(\d+\s+[^,]+),\s*(.+)$").unwrap();
    pub static ref SUITE_LINE: Regex = Regex::new(r"(?i)\b(?:apt|apartment|suite|ste|unit|#)\b").unwrap();
    pub static ref CITY_LABEL: Regex = Regex::new(r"(?i)^city\s*[:\-]\s*").unwrap();
    pub static ref CITY_STATE_ZIP: Regex = Regex::new(
        r"^(.+?),?\s+([A-Za-z]{2})\s+(\d{5}(?:-\d{4})?)$"
    ).unwrap();
    pub static ref CITY_STATE: Regex = Regex::new(r"^(.+?),\s*([A-Za-z]{2})$").unwrap();
    pub static ref CITY_ZIP_STATE: Regex = Regex::new(
        r"^(.+?),?\s+(\d{5}(?:-\d{4})?)\s+([A-Za-z]{2})$"
    ).unwrap();

    // Document type
    pub static ref BID_WORD: Regex = Regex::new(r"(?i)\bbid\b").unwrap();

    // Heuristic parser anchors
    pub static ref BILL_TO_ANCHOR: Regex = Regex::new(r"(?i)^(?:bill\s*to|client)\b").unwrap();
    pub static ref ANCHOR_REMAINDER: Regex = Regex::new(r"(?i)^(?:bill\s*to|client)\s*:\s*(\S.*)$").unwrap();
    pub static ref DATE_LINE: Regex = Regex::new(r"(?i)^date\b").unwrap();
    pub static ref DATE_LABEL: Regex = Regex::new(r"(?i)^date\s*[:\-]?\s*(.*)$").unwrap();
    pub static ref DESCRIPTION_WORD: Regex = Regex::new(r"(?i)\bdescription\b").unwrap();
    pub static ref QTY_WORD: Regex = Regex::new(r"(?i)\bqty\b").unwrap();
    pub static ref ITEM_HEADER_WORD: Regex = Regex::new(r"(?i)^(?:description|qty|rate|amount)\b").unwrap();
    pub static ref DOC_TYPE_LINE: Regex = Regex::new(r"(?i)^(?:invoice|bid)\b").unwrap();
    pub static ref TOTALS_LINE: Regex = Regex::new(r"(?i)^(?:subtotal|tax\b|discount\b|total\b)").unwrap();
    pub static ref NOTES_LINE: Regex = Regex::new(r"(?i)^(?:notes?\b|additional notes\b)").unwrap();
    pub static ref NOTES_REMAINDER: Regex = Regex::new(r"(?i)^(?:additional\s+)?notes?\s*:\s*(\S.*)$").unwrap();
    pub static ref TAX_LINE: Regex = Regex::new(r"(?i)^tax\b").unwrap();
    pub static ref DISCOUNT_LINE: Regex = Regex::new(r"(?i)^discount\b").unwrap();
    pub static ref PERCENT_VALUE: Regex = Regex::new(r"(-?\d+(?:\.\d+)?)\s*%").unwrap();
    pub static ref MONEY_TOKEN: Regex = Regex::new(r"-?\$?\(?-?[\d,]+(?:\.\d{1,2})?\)?").unwrap();
    pub static ref ITEM_ROW_FULL: Regex = Regex::new(
        r"^(.*\S)\s+(-?\d+(?:\.\d+)?)\s+\$?(-?[\d,]+(?:\.\d{1,2})?)\s+\$?(-?[\d,]+(?:\.\d{1,2})?)$"
    ).unwrap();
    pub static ref ITEM_ROW_COMPACT: Regex = Regex::new(
        r"^(.*\S)\s+(-?\d+(?:\.\d+)?)\s+\$?(-?[\d,]+(?:\.\d{1,2})?)$"
    ).unwrap();

    // HTML
    pub static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    pub static ref HTML_BREAK: Regex = Regex::new(
        r"(?i)<\s*br\s*/?>|</\s*(?:p|div|li|tr|h[1-6]|section|article)\s*>"
    ).unwrap();
    pub static ref HTML_SCRIPT_STYLE: Regex = Regex::new(
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_line() {
        assert!(TOTALS_LINE.is_match("Subtotal $300.00"));
        assert!(TOTALS_LINE.is_match("Tax 5%"));
        assert!(!TOTALS_LINE.is_match("Taxi fare 1 20.00"));
        assert!(!TOTALS_LINE.is_match("Totally new roof 1 900"));
    }

    #[test]
    fn test_phone_number() {
        assert!(PHONE_NUMBER.is_match("(555) 123-4567"));
        assert!(PHONE_NUMBER.is_match("+1 555.123.4567 ext. 9"));
        assert!(!PHONE_NUMBER.is_match("Springfield, IL 62704"));
    }

    #[test]
    fn test_locality_hint() {
        assert!(LOCALITY_HINT.is_match("Springfield, IL 62704"));
        assert!(LOCALITY_HINT.is_match("Austin TX 78701"));
        assert!(!LOCALITY_HINT.is_match("123 Main St"));
    }
}
