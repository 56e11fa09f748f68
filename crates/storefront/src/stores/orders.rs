//! Order submission flow.
//!
//! Validates the checkout form, snapshots the cart into an order payload,
//! posts it to the order service and clears the cart once the order exists.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{info, instrument, warn};

use tg_store_core::{Notification, UserId};

use super::cart::CartStore;
use super::{RequestStatus, lock, require_user, tracked};
use crate::error::{Result, StoreError, add_breadcrumb};
use crate::gateway::OrderApi;
use crate::models::{CheckoutRequest, CreatedOrder, OrderPayload};
use crate::notifications::NotificationChannel;

/// Toast shown once the order service accepts an order.
pub const ORDER_PLACED_MESSAGE: &str = "Order placed successfully!";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutState {
    pub status: RequestStatus,
    /// Response of the last accepted order.
    pub last_order: Option<CreatedOrder>,
}

/// Checkout state container. Clones share state.
#[derive(Clone)]
pub struct Checkout {
    inner: Arc<CheckoutInner>,
}

struct CheckoutInner {
    orders: Arc<dyn OrderApi>,
    cart: CartStore,
    notifications: NotificationChannel,
    state: Mutex<CheckoutState>,
}

impl Checkout {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderApi>,
        cart: CartStore,
        notifications: NotificationChannel,
    ) -> Self {
        Self {
            inner: Arc::new(CheckoutInner {
                orders,
                cart,
                notifications,
                state: Mutex::new(CheckoutState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CheckoutState {
        lock(&self.inner.state).clone()
    }

    /// Whether an order is being submitted.
    #[must_use]
    pub fn submitting(&self) -> bool {
        lock(&self.inner.state).status.loading
    }

    /// Submit the current cart as an order.
    ///
    /// On success the user's cart is cleared. A failed clear is logged but
    /// does not fail the order, which already exists remotely.
    ///
    /// # Errors
    ///
    /// `Validation` if the user id, phone or address is missing or the cart
    /// is empty; nothing is sent in that case. `Network` if the order service
    /// rejects the order, leaving the cart untouched.
    #[instrument(skip(self, request), fields(user_id = ?user_id, payment = %request.payment_method))]
    pub async fn place_order(
        &self,
        user_id: Option<&UserId>,
        request: CheckoutRequest,
    ) -> Result<CreatedOrder> {
        tracked(
            &self.inner.state,
            |s| &mut s.status,
            &self.inner.notifications,
            "checkout.place_order",
            async {
                let user_id = validate(user_id, &request)?;

                let items = self.inner.cart.items();
                if items.is_empty() {
                    return Err(StoreError::validation("Your cart is empty"));
                }

                let payload = OrderPayload::build(user_id.clone(), &items, request, Utc::now());
                add_breadcrumb("checkout", "Submitting order", Some(&[("user_id", user_id.as_str())]));
                let created = self.inner.orders.create_order(&payload).await?;
                info!(
                    order_id = ?created.id,
                    total = %payload.total_price,
                    lines = payload.items.len(),
                    "Order placed"
                );

                if let Err(err) = self.inner.cart.clear(user_id).await {
                    warn!(error = %err, "Order placed but cart could not be cleared");
                }

                lock(&self.inner.state).last_order = Some(created.clone());
                self.inner
                    .notifications
                    .enqueue(Notification::success(ORDER_PLACED_MESSAGE));
                Ok(created)
            },
        )
        .await
    }
}

fn validate<'a>(user_id: Option<&'a UserId>, request: &CheckoutRequest) -> Result<&'a UserId> {
    let user_id = require_user(user_id)?;
    if request.delivery.phone.trim().is_empty() {
        return Err(StoreError::validation("Phone number is required"));
    }
    if request.delivery.address.trim().is_empty() {
        return Err(StoreError::validation("Delivery address is required"));
    }
    Ok(user_id)
}
