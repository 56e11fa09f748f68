//! Type conversion functions from gateway documents to domain models.
//!
//! Remote documents are loosely typed: fields may be missing, null, or of
//! the wrong JSON type. Every reader here falls back to a default instead of
//! failing, so one malformed record never hides the rest of a listing.

mod cart;
mod catalog;
mod orders;
mod users;

pub use cart::{cart_record_fields, convert_cart_item, quantity_fields};
pub use catalog::{convert_category, convert_product};
pub use orders::{convert_created_order, convert_order};
pub use users::convert_user_profile;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use tg_store_core::Price;

/// String field, or `None` if absent or not a string.
pub(crate) fn opt_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        // Telegram ids are sometimes stored as numbers.
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// String field with a fallback.
pub(crate) fn string_or(value: &Value, default: &str) -> String {
    opt_string(value).unwrap_or_else(|| default.to_string())
}

/// Non-empty trimmed string, or `None`.
pub(crate) fn non_empty_string(value: &Value) -> Option<String> {
    opt_string(value).filter(|s| !s.trim().is_empty())
}

/// List of strings; non-string entries are dropped, a bare string becomes a
/// single-element list.
pub(crate) fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Decimal from a JSON number or numeric string.
pub(crate) fn decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Non-negative price, defaulting to zero.
pub(crate) fn price_or_zero(value: &Value) -> Price {
    decimal(value)
        .and_then(|d| Price::new(d).ok())
        .unwrap_or(Price::ZERO)
}

/// Non-negative integer, defaulting to `default`. Fractions are truncated.
pub(crate) fn u32_or(value: &Value, default: u32) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(truncate_non_negative))
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(default),
        Value::String(s) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Range checked above the cast
fn truncate_non_negative(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f < 18_446_744_073_709_551_616.0).then(|| f.trunc() as u64)
}

/// Boolean, defaulting to false.
pub(crate) fn bool_or_false(value: &Value) -> bool {
    value.as_bool().unwrap_or(false)
}
