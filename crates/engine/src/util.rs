//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every write path enforces the same invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage or a request and return a labeled error on
/// failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// NFC-normalizes a user-entered name and collapses inner whitespace.
///
/// Returns `None` for blank input.
pub(crate) fn normalize_name(input: &str) -> Option<String> {
    let mut out = String::new();
    for token in input.nfc().collect::<String>().split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() { None } else { Some(out) }
}

/// Like [`normalize_name`], failing with `InvalidId` on blank input.
pub(crate) fn required_name(input: &str, label: &str) -> ResultEngine<String> {
    normalize_name(input).ok_or_else(|| EngineError::InvalidId(format!("{label} must not be empty")))
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Validates the amount of a new payment: finite and not negative.
pub(crate) fn validate_amount(amount: f64) -> ResultEngine<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be a finite number >= 0, got {amount}"
        )));
    }
    Ok(amount)
}
