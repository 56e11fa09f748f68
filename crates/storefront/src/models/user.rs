//! User domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tg_store_core::UserId;

/// The Telegram user the Mini-App was opened by.
///
/// Supplied by the Telegram SDK bridge; the client never creates users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramUser {
    pub id: UserId,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl TelegramUser {
    /// "First Last", or just the first name.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name)
    }
}

/// A user profile as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    pub first_name: String,
    pub last_name: String,
    pub user_image: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
    /// Users this user has referred.
    pub referrals: Vec<UserId>,
    pub referred_by: Option<UserId>,
    pub is_premium: bool,
    /// Referral reward balance, ranks the leaderboard.
    pub balance: Decimal,
}

impl UserProfile {
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name)
    }
}

fn display_name(first: &str, last: &str) -> String {
    let first = first.trim();
    let last = last.trim();
    if last.is_empty() {
        first.to_string()
    } else {
        format!("{first} {last}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let user = TelegramUser {
            id: UserId::new("1"),
            first_name: "Abebe".to_string(),
            last_name: String::new(),
            username: None,
            language_code: None,
            photo_url: None,
        };
        assert_eq!(user.display_name(), "Abebe");

        let user = TelegramUser {
            last_name: "Bikila".to_string(),
            ..user
        };
        assert_eq!(user.display_name(), "Abebe Bikila");
    }
}
