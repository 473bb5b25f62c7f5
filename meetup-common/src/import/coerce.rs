//! Cell coercions
//!
//! Every function takes the raw cell (`None` when the column is not mapped)
//! and never fails; unusable input becomes a fallback value.

use once_cell::sync::Lazy;
use regex::Regex;

use super::policy::NumericFallback;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Trimmed free text; empty or a stray `true`/`false` becomes `None`
pub fn text(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
        return None;
    }
    Some(value.to_string())
}

/// Integer after stripping everything but digits and a leading minus.
///
/// A missing column is always `None`; a present but unparseable cell takes
/// the configured fallback.
pub fn integer(raw: Option<&str>, fallback: NumericFallback) -> Option<i64> {
    let raw = raw?;
    let mut digits = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if c == '-' && digits.is_empty() {
            digits.push(c);
        }
    }
    digits.parse::<i64>().ok().or_else(|| fallback.value())
}

/// `true` iff the cell is `yes` (any case)
pub fn flag(raw: Option<&str>) -> bool {
    raw.map(|value| value.trim().eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

/// Semicolon-separated list, trimmed, empties dropped, order kept
pub fn list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(';')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// LinkedIn profile reference expanded to a full URL where recognizable.
///
/// Other text passes through unchanged; no URL validation is done.
pub fn linkedin_url(raw: Option<&str>) -> Option<String> {
    let value = text(raw)?;
    if value.starts_with("/in/") {
        Some(format!("https://linkedin.com{}", value))
    } else if value.starts_with("linkedin.com") {
        Some(format!("https://{}", value))
    } else {
        Some(value)
    }
}

/// Lowercase `name` keeping only `[a-z0-9]`
pub fn slugify_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Loose `local@domain.tld` check
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
