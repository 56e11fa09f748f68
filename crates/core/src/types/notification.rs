//! User-facing feedback messages.

use serde::{Deserialize, Serialize};

/// Severity of a notification, serialized as the color tag the UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "green")]
    Success,
    #[serde(rename = "red")]
    Error,
    #[serde(rename = "gray")]
    Info,
}

impl Severity {
    /// The color tag.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Success => "green",
            Self::Error => "red",
            Self::Info => "gray",
        }
    }
}

/// A single ephemeral message for the UI to show once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    #[serde(rename = "color")]
    pub severity: Severity,
}

impl Notification {
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serializes_color_tag() {
        let json = serde_json::to_value(Notification::info("Product already in cart"))
            .unwrap_or_default();
        assert_eq!(json["message"], "Product already in cart");
        assert_eq!(json["color"], "gray");
    }
}
