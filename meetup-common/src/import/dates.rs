//! Bilingual (French/English) date parsing
//!
//! Formats are tried in a fixed order and the first match wins:
//!
//! 1. `6 juin 2024` / `6 june 2024` (day, month name, year)
//! 2. `June 6, 2024` (month name and day, comma, year)
//! 3. `2024-06-06`
//! 4. `6/14/2024` month first, or `14/6/2024` when the first number exceeds 12
//! 5. generic timestamp formats (RFC 3339, RFC 2822, a few common layouts)
//!
//! Matching runs on a trimmed, lowercased, quote-stripped copy of the cell.
//! Date-only forms resolve to midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::time::midnight_utc;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid ISO date regex"));

static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid slash date regex"));

/// Month names, zero-based month index
const MONTH_NAMES: &[(&str, u32)] = &[
    // French
    ("janvier", 0),
    ("février", 1),
    ("fevrier", 1),
    ("mars", 2),
    ("avril", 3),
    ("mai", 4),
    ("juin", 5),
    ("juillet", 6),
    ("août", 7),
    ("aout", 7),
    ("septembre", 8),
    ("octobre", 9),
    ("novembre", 10),
    ("décembre", 11),
    ("decembre", 11),
    // English
    ("january", 0),
    ("february", 1),
    ("march", 2),
    ("april", 3),
    ("may", 4),
    ("june", 5),
    ("july", 6),
    ("august", 7),
    ("september", 8),
    ("october", 9),
    ("november", 10),
    ("december", 11),
];

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%B %d %Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %b %Y",
];

/// Parse a date cell; `None` when no format matches
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    day_month_year(cleaned)
        .or_else(|| month_day_comma_year(cleaned))
        .or_else(|| iso_date(cleaned))
        .or_else(|| slash_date(cleaned))
        .map(midnight_utc)
        .or_else(|| generic(cleaned))
}

/// Zero-based month index for a French or English month name
fn month_index(name: &str) -> Option<u32> {
    let name = name.trim_end_matches('.');
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, index)| *index)
}

fn calendar_date(year: i32, month_index: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month_index + 1, day)
}

/// `6 juin 2024`
fn day_month_year(s: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    if tokens.len() != 3 {
        return None;
    }
    let day = tokens[0].parse::<u32>().ok()?;
    let month = month_index(tokens[1])?;
    let year = tokens[2].parse::<i32>().ok()?;
    calendar_date(year, month, day)
}

/// `june 6, 2024`
fn month_day_comma_year(s: &str) -> Option<NaiveDate> {
    let (date_part, year_part) = s.split_once(',')?;
    let mut tokens = date_part.split_whitespace();
    let month = month_index(tokens.next()?)?;
    let day = tokens.next()?.parse::<u32>().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    let year = year_part.trim().parse::<i32>().ok()?;
    calendar_date(year, month, day)
}

/// `2024-06-06`
fn iso_date(s: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(s)?;
    let year = caps[1].parse::<i32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    let day = caps[3].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `6/14/2024`, reinterpreted as day/month when the first number exceeds 12
fn slash_date(s: &str) -> Option<NaiveDate> {
    let caps = SLASH_DATE.captures(s)?;
    let first = caps[1].parse::<u32>().ok()?;
    let second = caps[2].parse::<u32>().ok()?;
    let year = caps[3].parse::<i32>().ok()?;
    let (month, day) = if first > 12 { (second, first) } else { (first, second) };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn generic(s: &str) -> Option<DateTime<Utc>> {
    // timestamp separators and zone designators are matched in upper case
    let upper = s.to_uppercase();
    if let Ok(dt) = DateTime::parse_from_rfc3339(&upper) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&upper) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&upper, format) {
            return Some(naive.and_utc());
        }
    }
    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .map(midnight_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd(dt: DateTime<Utc>) -> (i32, u32, u32) {
        (dt.year(), dt.month(), dt.day())
    }

    #[test]
    fn test_bilingual_forms_agree() {
        let french = parse_date("6 juin 2024").unwrap();
        let english = parse_date("June 6, 2024").unwrap();
        let iso = parse_date("2024-06-06").unwrap();
        assert_eq!(ymd(french), (2024, 6, 6));
        assert_eq!(french, english);
        assert_eq!(french, iso);
    }

    #[test]
    fn test_day_month_year_english_and_unaccented() {
        assert_eq!(ymd(parse_date("1 March 2023").unwrap()), (2023, 3, 1));
        assert_eq!(ymd(parse_date("15 aout 2022").unwrap()), (2022, 8, 15));
        assert_eq!(ymd(parse_date("15 Août 2022").unwrap()), (2022, 8, 15));
        assert_eq!(ymd(parse_date("3 fevrier 2021").unwrap()), (2021, 2, 3));
        assert_eq!(ymd(parse_date("25 Décembre 2020").unwrap()), (2020, 12, 25));
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        let dt = parse_date("6 juin 2024").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
    }

    #[test]
    fn test_quotes_and_case_are_ignored() {
        assert_eq!(ymd(parse_date("  \"JUNE 6, 2024\" ").unwrap()), (2024, 6, 6));
    }

    #[test]
    fn test_slash_month_first() {
        assert_eq!(ymd(parse_date("6/7/2024").unwrap()), (2024, 6, 7));
        assert_eq!(ymd(parse_date("12/31/2023").unwrap()), (2023, 12, 31));
    }

    #[test]
    fn test_slash_day_first_when_month_overflows() {
        assert_eq!(ymd(parse_date("25/12/2023").unwrap()), (2023, 12, 25));
    }

    #[test]
    fn test_invalid_calendar_dates() {
        assert_eq!(parse_date("31 février 2024"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("13/13/2024"), None);
    }

    #[test]
    fn test_non_numeric_day_falls_through() {
        // first format fails on the day token, generic month-name layout picks it up
        assert_eq!(ymd(parse_date("June 6 2024").unwrap()), (2024, 6, 6));
    }

    #[test]
    fn test_abbreviated_month_with_comma() {
        assert_eq!(ymd(parse_date("Jun 6, 2024").unwrap()), (2024, 6, 6));
        assert_eq!(ymd(parse_date("Sep 12, 2023").unwrap()), (2023, 9, 12));
        assert_eq!(parse_date("Jun 6, 2024").unwrap(), parse_date("June 6, 2024").unwrap());
    }

    #[test]
    fn test_generic_timestamps() {
        let dt = parse_date("2024-06-06T14:30:00Z").unwrap();
        assert_eq!((ymd(dt), dt.hour(), dt.minute()), ((2024, 6, 6), 14, 30));

        let dt = parse_date("2024-06-06 09:15:00").unwrap();
        assert_eq!((ymd(dt), dt.hour()), ((2024, 6, 6), 9));

        assert_eq!(ymd(parse_date("06.06.2024").unwrap()), (2024, 6, 6));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("sometime last year"), None);
        assert_eq!(parse_date("6 juni 2024"), None);
    }
}
