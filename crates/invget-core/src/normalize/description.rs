//! Splitting a free-form line item description into address and work.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ZIP_CODE: Regex = Regex::new(r"\d{5}(?:-\d{4})?").unwrap();
}

const SEPARATORS: [&str; 4] = [" | ", " - ", " \u{2014} ", " \u{2013} "];

/// Address and work parts of a description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionParts {
    pub address: String,
    pub work: String,
}

/// Split a description into its address and work parts.
///
/// Multi-line text puts the first line in the address and the rest in the
/// work. A single line is split at the first spaced pipe or dash separator,
/// then after the last ZIP code. Otherwise it is all address.
pub fn split_description(description: &str) -> DescriptionParts {
    let raw = description.trim();
    if raw.is_empty() {
        return DescriptionParts::default();
    }

    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() > 1 {
        return DescriptionParts {
            address: lines[0].to_string(),
            work: lines[1..].join("\n"),
        };
    }

    for separator in SEPARATORS {
        if let Some(index) = raw.find(separator).filter(|index| *index > 0) {
            return DescriptionParts {
                address: raw[..index].trim().to_string(),
                work: raw[index + separator.len()..].trim().to_string(),
            };
        }
    }

    if let Some(last_zip) = ZIP_CODE.find_iter(raw).last() {
        if last_zip.end() < raw.len() {
            return DescriptionParts {
                address: raw[..last_zip.end()].trim().to_string(),
                work: raw[last_zip.end()..].trim().to_string(),
            };
        }
    }

    DescriptionParts {
        address: raw.to_string(),
        work: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(address: &str, work: &str) -> DescriptionParts {
        DescriptionParts {
            address: address.to_string(),
            work: work.to_string(),
        }
    }

    #[test]
    fn test_multi_line() {
        assert_eq!(
            split_description("12 Elm St\nReplace gutters\nHaul debris"),
            parts("12 Elm St", "Replace gutters\nHaul debris")
        );
    }

    #[test]
    fn test_separators() {
        assert_eq!(split_description("12 Elm St | Paint fence"), parts("12 Elm St", "Paint fence"));
        assert_eq!(split_description("12 Elm St - Paint fence"), parts("12 Elm St", "Paint fence"));
        assert_eq!(
            split_description("12 Elm St \u{2014} Paint fence"),
            parts("12 Elm St", "Paint fence")
        );
    }

    #[test]
    fn test_zip_split() {
        assert_eq!(
            split_description("12 Elm St Springfield IL 62704 mow lawn"),
            parts("12 Elm St Springfield IL 62704", "mow lawn")
        );
        assert_eq!(
            split_description("12 Elm St Springfield IL 62704"),
            parts("12 Elm St Springfield IL 62704", "")
        );
    }

    #[test]
    fn test_plain_text_is_address() {
        assert_eq!(split_description("Consulting"), parts("Consulting", ""));
        assert_eq!(split_description("   "), parts("", ""));
    }
}
