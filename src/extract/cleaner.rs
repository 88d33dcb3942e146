use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::patterns;

lazy_static! {
    // `.` stops at a newline, so only the rest of the price's line goes.
    static ref TRAILING_PRICE: Regex = Regex::new(r"₹.*").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref STOP_WORDS: Regex = Regex::new(r"(?i)\b(add|added|view|buy|select|choose)\b").unwrap();
}

/// Why a cleaned name cannot stand as a product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameRejection {
    #[error("name is only a quantity")]
    QuantityOnly,
    #[error("name starts with a quantity")]
    LeadingQuantity,
    #[error("name shorter than 5 characters")]
    TooShort,
    #[error("name has fewer than 3 letters")]
    TooFewLetters,
    #[error("name has no alphanumeric character")]
    NoAlphanumeric,
    #[error("name is a bare pack count")]
    PackOnly,
}

// ── Cleanup ───────────────────────────────────────────────────────────────────

/// "Buy Fresh Onion  ₹30/kg" → "Fresh Onion"
pub fn clean_name(raw: &str) -> String {
    let name = TRAILING_PRICE.replace_all(raw, "");
    let name = WHITESPACE.replace_all(name.trim(), " ");
    let name = STOP_WORDS.replace_all(&name, "");
    WHITESPACE.replace_all(name.trim(), " ").into_owned()
}

// ── Validation ────────────────────────────────────────────────────────────────

/// Checks run in order; the first failing rule is reported.
pub fn validate_name(name: &str) -> Result<(), NameRejection> {
    if patterns::is_quantity_only(name) {
        return Err(NameRejection::QuantityOnly);
    }
    if patterns::starts_with_quantity(name) {
        return Err(NameRejection::LeadingQuantity);
    }
    if name.chars().count() < 5 {
        return Err(NameRejection::TooShort);
    }
    if name.chars().filter(|c| c.is_alphabetic()).count() < 3 {
        return Err(NameRejection::TooFewLetters);
    }
    if !name.chars().any(char::is_alphanumeric) {
        return Err(NameRejection::NoAlphanumeric);
    }
    if patterns::is_pack_only(name) {
        return Err(NameRejection::PackOnly);
    }
    Ok(())
}
