//! Single-slot notification channel.
//!
//! Stores enqueue a message after each operation; the UI consumes it once and
//! shows a toast. A newer message overwrites one that was never consumed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tg_store_core::Notification;

/// Process-wide notification slot. Clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct NotificationChannel {
    pending: Arc<Mutex<Option<Notification>>>,
}

impl NotificationChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Notification>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the pending notification.
    pub fn enqueue(&self, notification: Notification) {
        tracing::debug!(
            message = %notification.message,
            color = notification.severity.color(),
            "Notification enqueued"
        );
        *self.slot() = Some(notification);
    }

    /// Take the pending notification, leaving the slot empty.
    #[must_use]
    pub fn consume(&self) -> Option<Notification> {
        self.slot().take()
    }

    /// Read the pending notification without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<Notification> {
        self.slot().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_overwrites() {
        let channel = NotificationChannel::new();
        channel.enqueue(Notification::info("first"));
        channel.enqueue(Notification::error("second"));

        assert_eq!(channel.consume(), Some(Notification::error("second")));
        assert_eq!(channel.consume(), None);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let channel = NotificationChannel::new();
        channel.enqueue(Notification::success("Order placed successfully!"));

        assert!(channel.peek().is_some());
        assert!(channel.consume().is_some());
        assert!(channel.peek().is_none());
    }

    #[test]
    fn test_clones_share_slot() {
        let channel = NotificationChannel::new();
        let other = channel.clone();
        other.enqueue(Notification::info("shared"));
        assert_eq!(channel.consume(), Some(Notification::info("shared")));
    }
}
