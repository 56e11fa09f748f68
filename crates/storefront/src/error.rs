//! Store-level error handling with Sentry integration.
//!
//! Every store operation returns `Result<T, StoreError>`. Failures are also
//! recorded at the store boundary (error string + notification), so callers
//! that only render state never need to match on them.

use thiserror::Error;

use tg_store_core::{Notification, ProductId, RecordId, Severity};

use crate::gateway::GatewayError;

/// Error type shared by every store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The product already has a cart record for this user.
    #[error("Product already in cart")]
    DuplicateItem(ProductId),

    /// No cart record with this id belongs to the user.
    #[error("Cart item not found: {0}")]
    ItemNotFound(RecordId),

    /// Gateway call failed.
    #[error("Network error: {0}")]
    Network(#[from] GatewayError),
}

impl StoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Message suitable for a toast.
    ///
    /// Network failures show the server's `error` field when it sent one,
    /// otherwise `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::DuplicateItem(_) => self.to_string(),
            Self::ItemNotFound(_) => "Item not found in cart".to_string(),
            Self::Network(err) => err.server_message().unwrap_or(fallback).to_string(),
        }
    }

    /// Severity of the notification raised for this error.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::DuplicateItem(_) => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Notification raised for this error.
    #[must_use]
    pub fn notification(&self, fallback: &str) -> Notification {
        Notification::new(self.user_message(fallback), self.severity())
    }

    /// Log the error, capturing network failures to Sentry.
    pub fn report(&self, operation: &str) {
        match self {
            Self::Network(_) => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    operation,
                    sentry_event_id = %event_id,
                    "Store operation failed"
                );
            }
            Self::ItemNotFound(_) => {
                tracing::warn!(error = %self, operation, "Store operation failed");
            }
            Self::Validation(_) | Self::DuplicateItem(_) => {
                tracing::debug!(error = %self, operation, "Store operation rejected");
            }
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Set the Sentry user context from a Telegram user.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
