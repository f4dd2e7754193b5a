//! Date coercion to `YYYY-MM-DD`.

use chrono::NaiveDate;

use super::normalize_space;
use super::patterns::{
    DAY_MONTH_YEAR, ISO_DATE, ISO_DATE_TOKEN, MONTH_DAY_YEAR, MONTH_NAME_DATE_TOKEN,
    ORDINAL_SUFFIX, SLASH_DATE, SLASH_DATE_TOKEN, YMD_SLASH_DATE,
};

/// Parse a date written as ISO, US slash form (`M/D/Y`) or with a month name.
///
/// Returns `None` for anything that is not a real calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let stripped = ORDINAL_SUFFIX.replace_all(value, "${1}");
    let raw = normalize_space(&stripped);
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_DATE.captures(&raw) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = SLASH_DATE.captures(&raw) {
        let year = parse_year(&caps[3])?;
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = YMD_SLASH_DATE.captures(&raw) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = MONTH_DAY_YEAR.captures(&raw) {
        let month = month_to_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(&raw) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_to_number(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Coerce a date-ish string to `YYYY-MM-DD`, or an empty string.
pub fn to_iso_date(value: &str) -> String {
    parse_date(value)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Find the first recognizable date inside free text.
///
/// ISO tokens are tried first, then slash dates, then month-name dates.
pub fn find_date_token(text: &str) -> String {
    for pattern in [&*ISO_DATE_TOKEN, &*SLASH_DATE_TOKEN, &*MONTH_NAME_DATE_TOKEN] {
        if let Some(found) = pattern.find(text) {
            let iso = to_iso_date(found.as_str());
            if !iso.is_empty() {
                return iso;
            }
        }
    }
    String::new()
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Two-digit years are taken as 20xx.
fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if year < 100 {
        Some(2000 + year)
    } else {
        Some(year)
    }
}

fn month_to_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let month = match lower.as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}
