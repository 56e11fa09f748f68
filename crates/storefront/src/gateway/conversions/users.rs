//! User profile conversions.

use rust_decimal::Decimal;
use serde_json::Value;

use tg_store_core::UserId;

use super::{bool_or_false, decimal, non_empty_string, opt_string, string_or};
use crate::gateway::Document;
use crate::models::UserProfile;

/// Convert a `users` document. The document id is the Telegram id.
pub fn convert_user_profile(doc: &Document) -> UserProfile {
    let referrals = doc
        .field("referrals")
        .as_array()
        .map(|ids| ids.iter().filter_map(opt_string).map(UserId::new).collect())
        .unwrap_or_default();

    UserProfile {
        uid: non_empty_string(doc.field("uid")).map_or_else(|| UserId::new(doc.id.as_str()), UserId::new),
        first_name: string_or(doc.field("firstName"), ""),
        last_name: string_or(doc.field("lastName"), ""),
        user_image: non_empty_string(doc.field("userImage")),
        username: non_empty_string(doc.field("username")),
        language_code: non_empty_string(doc.field("languageCode")),
        referrals,
        referred_by: non_empty_string(doc.field("referredBy")).map(UserId::new),
        is_premium: bool_or_false(doc.field("isPremium")),
        balance: balance(doc.field("balance")),
    }
}

fn balance(value: &Value) -> Decimal {
    decimal(value).unwrap_or(Decimal::ZERO)
}
