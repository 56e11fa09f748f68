//! Past orders of the current user.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, instrument};

use tg_store_core::UserId;

use super::{RequestStatus, lock, require_user, tracked};
use crate::error::Result;
use crate::gateway::conversions::convert_order;
use crate::gateway::{DocumentStore, ORDERS, Query};
use crate::models::Order;
use crate::notifications::NotificationChannel;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderHistoryState {
    /// Newest first.
    pub orders: Vec<Order>,
    pub status: RequestStatus,
}

/// Order history state container. Clones share state.
#[derive(Clone)]
pub struct OrderHistory {
    inner: Arc<OrderHistoryInner>,
}

struct OrderHistoryInner {
    documents: Arc<dyn DocumentStore>,
    notifications: NotificationChannel,
    state: Mutex<OrderHistoryState>,
}

impl OrderHistory {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, notifications: NotificationChannel) -> Self {
        Self {
            inner: Arc::new(OrderHistoryInner {
                documents,
                notifications,
                state: Mutex::new(OrderHistoryState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> OrderHistoryState {
        lock(&self.inner.state).clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.inner.state).orders.clone()
    }

    /// Load every order of the user, newest first.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank user id, `Network` if the gateway fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn fetch(&self, user_id: &UserId) -> Result<Vec<Order>> {
        tracked(
            &self.inner.state,
            |s| &mut s.status,
            &self.inner.notifications,
            "history.fetch",
            async {
                require_user(user_id)?;

                let docs = self
                    .inner
                    .documents
                    .query(ORDERS, &Query::new().where_eq("userId", user_id.as_str()))
                    .await?;

                let now = Utc::now();
                let mut orders: Vec<Order> =
                    docs.iter().map(|doc| convert_order(doc, now)).collect();
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                debug!(count = orders.len(), "Fetched order history");

                lock(&self.inner.state).orders.clone_from(&orders);
                Ok(orders)
            },
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;
    use tg_store_core::{OrderStatus, PaymentMethod};

    use super::*;
    use crate::gateway::InMemoryDocumentStore;

    #[tokio::test]
    async fn test_fetch_sorts_newest_first_and_scopes_user() -> TestResult {
        let documents = InMemoryDocumentStore::new();
        let order = |user: &str, created: &str| {
            json!({"userId": user, "createdAt": created, "totalPrice": 12, "status": "pending"})
                .as_object()
                .cloned()
                .unwrap()
        };
        documents.insert(ORDERS, "old", order("42", "2025-01-01T08:00:00Z"));
        documents.insert(ORDERS, "new", order("42", "2025-02-01T08:00:00Z"));
        documents.insert(ORDERS, "other", order("7", "2025-03-01T08:00:00Z"));
        let history = OrderHistory::new(Arc::new(documents), NotificationChannel::new());

        let orders = history.fetch(&UserId::new("42")).await?;

        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(orders[0].status, OrderStatus::Pending);
        assert_eq!(orders[0].payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(history.orders().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_is_kept_visible() -> TestResult {
        let documents = InMemoryDocumentStore::new();
        documents.insert(
            ORDERS,
            "o1",
            json!({"userId": "42", "status": "refunded"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let history = OrderHistory::new(Arc::new(documents), NotificationChannel::new());

        let orders = history.fetch(&UserId::new("42")).await?;
        assert_eq!(orders[0].status, OrderStatus::Unknown);
        Ok(())
    }
}
