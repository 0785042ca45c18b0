//! Value normalization shared by the column resolver and the staging builder.
//!
//! One fixed locale is assumed (pt-BR): comma decimal separator, dot
//! thousands separator.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;

/// Cell value that marks an item as a courtesy (no charge).
pub const COURTESY_FLAG: &str = "s";

/// Combining diacritical marks block removed after NFD decomposition.
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Lowercase, strip diacritics, collapse every run of non `[a-z0-9]`
/// characters into one space, trim.
///
/// `"Cód. da Proposta"` becomes `"cod da proposta"`.
pub fn normalize_header(value: &str) -> String {
    let folded: String = value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut out = String::with_capacity(folded.len());
    let mut pending_gap = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_gap && !out.is_empty() {
                out.push(' ');
            }
            pending_gap = false;
            out.push(c);
        } else {
            pending_gap = true;
        }
    }
    out
}

/// Trimmed cell text, `None` when blank.
pub fn safe_str(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a pt-BR formatted number: `"1.234,56"` → `1234.56`, `"0,5%"` → `0.5`.
///
/// Returns `None` for blank input or anything that does not parse to a
/// finite number.
pub fn parse_pt_br_number(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }

    let compact: String = raw
        .chars()
        .filter(|c| *c != '%' && !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if compact.is_empty() {
        return None;
    }

    compact.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// True exactly when the trimmed, lowercased cell equals [`COURTESY_FLAG`].
pub fn is_courtesy(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().to_lowercase() == COURTESY_FLAG)
}

/// Locale-aware ordering for proposal codes.
///
/// Primary comparison ignores case and diacritics. Ties put lowercase
/// before uppercase, then fall back to the raw strings so the order is
/// total and deterministic.
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.chars().map(swap_case).cmp(b.chars().map(swap_case)))
        .then_with(|| a.cmp(b))
}

fn swap_case(c: char) -> char {
    if c.is_uppercase() {
        c.to_lowercase().next().unwrap_or(c)
    } else if c.is_lowercase() {
        c.to_uppercase().next().unwrap_or(c)
    } else {
        c
    }
}

fn collation_key(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}
