//! Address block normalization.
//!
//! Turns a noisy address blob (OCR output, model output, pasted text) into a
//! canonical block:
//!
//! ```text
//! 123 Main St, Suite 5
//! Springfield, IL 62704
//! <any extra lines>
//! (555) 123-4567
//! ```
//!
//! The output is a fixed point: normalizing it again yields the same text.

use regex::Captures;

use super::normalize_space;
use super::patterns::{
    CITY_LABEL, CITY_STATE, CITY_STATE_ZIP, CITY_ZIP_STATE, COMMA_SPACING, COUNTY_ROAD_GLUE,
    LOCALITY_HINT, LOWER_UPPER_GLUE, NAME_PARTICLE_END, ONE_LINE_ADDRESS, PHONE_LABEL,
    STREET_START, STREET_SUFFIX_GLUE, SUITE_LINE,
};
use super::phone::{extract_phone, format_phone};

/// Repair spacing inside a single address line.
///
/// Collapses whitespace, normalizes comma spacing and splits tokens that
/// OCR or PDF extraction glued together:
/// - county road letters fused with an uppercase city (`CR CKLCHAMPION, MI 49814`)
/// - a street suffix fused with a city before `ST ZIP` (`HEMLOCK STREPUBLIC, MI 49879`)
/// - lowercase or digit followed by a Title-case word (`123Main`), except after
///   name particles such as `Mc` or `De`
pub fn repair_line(value: &str) -> String {
    let line = normalize_space(value);
    if line.is_empty() {
        return line;
    }

    let line = COMMA_SPACING.replace_all(&line, ", ");
    let line = COUNTY_ROAD_GLUE.replace_all(&line, "${1}${2} ${3}${4}");
    let line = STREET_SUFFIX_GLUE.replace_all(&line, "${1} ${2}");
    let line = split_glued_words(&line);

    normalize_space(&COMMA_SPACING.replace_all(&line, ", "))
}

fn split_glued_words(line: &str) -> String {
    LOWER_UPPER_GLUE
        .replace_all(line, |caps: &Captures| {
            let head_end = caps.get(1).map_or(0, |m| m.end());
            if NAME_PARTICLE_END.is_match(&line[..head_end]) {
                caps[0].to_string()
            } else {
                format!("{} {}", &caps[1], &caps[2])
            }
        })
        .into_owned()
}

/// Normalize a locality line to `City, ST ZIP` when it has that shape.
///
/// Accepts `City ST ZIP`, `City, ST ZIP` and `City ZIP ST`, optionally behind
/// a `City:` label. Anything else is returned with spacing repaired.
pub fn normalize_locality(value: &str) -> String {
    let unlabeled = CITY_LABEL.replace(value.trim(), "");
    let raw = repair_line(&unlabeled);
    if raw.is_empty() {
        return raw;
    }

    if let Some(caps) = CITY_STATE_ZIP.captures(&raw) {
        return format_locality(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = CITY_ZIP_STATE.captures(&raw) {
        return format_locality(&caps[1], &caps[3], &caps[2]);
    }
    raw
}

fn format_locality(city: &str, state: &str, zip: &str) -> String {
    let city = normalize_space(city.trim_end().trim_end_matches(','));
    format!("{}, {} {}", city, state.to_uppercase(), zip)
}

fn is_complete_locality(line: &str) -> bool {
    CITY_STATE_ZIP.is_match(line) || CITY_STATE.is_match(line)
}

/// Normalize an address block.
///
/// With `include_phone`, the first phone number is pulled out (along with
/// `Phone:`/`Tel:` style labels) and appended, formatted, as the last line.
pub fn normalize_address(value: &str, include_phone: bool) -> String {
    let raw = value.replace('\r', "\n");
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let mut text = raw.to_string();
    let mut phone = None;
    if include_phone {
        if let Some(found) = extract_phone(raw) {
            text.replace_range(found.span, " ");
            phone = Some(format_phone(&found.raw));
        }
        text = PHONE_LABEL.replace_all(&text, " ").into_owned();
    }

    let lines: Vec<String> = text
        .split('\n')
        .map(repair_line)
        .filter(|line| !line.is_empty())
        .collect();

    let parts = match lines.as_slice() {
        [] => AddressParts::default(),
        [single] => AddressParts::from_single_line(single),
        _ => AddressParts::from_lines(&lines),
    };
    parts.into_block(phone)
}

#[derive(Debug, Default)]
struct AddressParts {
    street: String,
    locality: String,
    extras: Vec<String>,
}

impl AddressParts {
    fn from_single_line(line: &str) -> Self {
        if let Some((street, locality)) = split_street_and_locality(line) {
            return Self {
                street,
                locality,
                extras: Vec::new(),
            };
        }

        if STREET_START.is_match(line) && !LOCALITY_HINT.is_match(line) {
            Self {
                street: line.to_string(),
                ..Self::default()
            }
        } else {
            Self {
                locality: line.to_string(),
                ..Self::default()
            }
        }
    }

    fn from_lines(lines: &[String]) -> Self {
        let mut used = vec![false; lines.len()];
        let mut parts = Self::default();

        let mut street_idx = lines.iter().position(|line| STREET_START.is_match(line));
        let locality_idx = (0..lines.len())
            .find(|&idx| Some(idx) != street_idx && LOCALITY_HINT.is_match(&lines[idx]));

        if let Some(idx) = street_idx {
            parts.street = lines[idx].clone();
            used[idx] = true;
        }

        match locality_idx {
            Some(idx) => {
                parts.locality = lines[idx].clone();
                used[idx] = true;
            }
            None => {
                // The street line may carry the locality after a comma.
                let split = street_idx
                    .filter(|&idx| LOCALITY_HINT.is_match(&lines[idx]))
                    .and_then(|idx| split_street_and_locality(&lines[idx]))
                    .filter(|(_, locality)| !locality.is_empty());
                if let Some((street, locality)) = split {
                    parts.street = street;
                    parts.locality = locality;
                }
            }
        }

        if parts.street.is_empty() && parts.locality.is_empty() {
            parts.street = lines[0].clone();
            used[0] = true;
            street_idx = Some(0);
        }

        if !parts.street.is_empty() {
            for (idx, line) in lines.iter().enumerate() {
                if used[idx] || !SUITE_LINE.is_match(line) {
                    continue;
                }
                if !parts.street.contains(line.as_str()) {
                    parts.street = format!("{}, {}", parts.street, line);
                }
                used[idx] = true;
            }
        }

        if parts.locality.is_empty() {
            let after = street_idx.map_or(0, |idx| idx + 1);
            if let Some(idx) = (after..lines.len()).find(|&idx| !used[idx]) {
                parts.locality = lines[idx].clone();
                used[idx] = true;
            }
        }

        parts.extras = lines
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|(line, _)| line.clone())
            .collect();
        parts
    }

    fn into_block(self, phone: Option<String>) -> String {
        let mut out = Vec::with_capacity(self.extras.len() + 3);
        if !self.street.is_empty() {
            out.push(self.street.clone());
        }

        let locality = normalize_locality(&self.locality);
        if !locality.is_empty() && locality != self.street {
            out.push(locality);
        }

        out.extend(self.extras);
        if let Some(phone) = phone.filter(|phone| !phone.is_empty()) {
            out.push(phone);
        }
        out.join("\n")
    }
}

/// Split `123 Main St, Suite 5, Springfield, IL 62704` at its commas.
///
/// Suite parts directly after the street stay on the street line. The split is
/// refused when the remainder carries a state or ZIP but is not a complete
/// locality on its own (for example just `IL 62704`).
fn split_street_and_locality(line: &str) -> Option<(String, String)> {
    let caps = ONE_LINE_ADDRESS.captures(line)?;
    let mut street = normalize_space(&caps[1]);

    let rest: Vec<String> = caps[2]
        .split(',')
        .map(normalize_space)
        .filter(|part| !part.is_empty())
        .collect();

    let suites = rest.iter().take_while(|part| SUITE_LINE.is_match(part)).count();
    for suite in &rest[..suites] {
        street = format!("{street}, {suite}");
    }

    let locality = rest[suites..].join(", ");
    if locality.is_empty() {
        return Some((street, locality));
    }
    if LOCALITY_HINT.is_match(&locality) && !is_complete_locality(&normalize_locality(&locality)) {
        return None;
    }
    Some((street, locality))
}
