//! Parsing of numeric form input.
//!
//! Form fields arrive as text. Whole numbers are parsed leniently (`"12.7"`
//! truncates to `12`, `"-3.9"` to `-3`), and damage/heal fields accept several
//! rolled values at once: `"5 3"`, `"4, 6"` and `"2+2+1"` all sum their terms.

use std::sync::LazyLock;

use regex::Regex;

use super::error::ValidationError;

/// Whitespace, commas and plus signs separate rolled terms.
static TERM_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s,+]+").unwrap());

/// Parse a finite number and truncate it toward zero.
///
/// Returns `None` for empty, non-numeric, non-finite (`NaN`, `inf`) input or
/// values that do not fit in an `i32`.
pub fn parse_whole_number(input: &str) -> Option<i32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    whole_number_from_f64(trimmed.parse().ok()?)
}

/// Truncate a finite `f64` toward zero if it fits in an `i32`.
pub fn whole_number_from_f64(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
        return None;
    }
    Some(truncated as i32)
}

/// Sum every positive whole-number term in a damage/heal entry.
///
/// Non-numeric and non-positive terms are discarded. Returns `None` when
/// nothing positive remains.
pub fn sum_positive_terms(input: &str) -> Option<i32> {
    let total: i64 = TERM_SEPARATOR_RE
        .split(input.trim())
        .filter_map(parse_whole_number)
        .filter(|term| *term > 0)
        .map(i64::from)
        .sum();

    if total <= 0 {
        return None;
    }
    Some(total.min(i64::from(i32::MAX)) as i32)
}

/// Like [`sum_positive_terms`] but reports a validation error for the caller to show.
pub fn parse_adjustment(input: &str) -> Result<i32, ValidationError> {
    sum_positive_terms(input).ok_or_else(|| ValidationError::InvalidAdjustment(input.trim().to_string()))
}
