//! Application context shared by every screen.

use std::sync::{Arc, Mutex};

use tracing::info;

use tg_store_core::{Notification, UserId};

use crate::config::StorefrontConfig;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::gateway::{DocumentStore, HttpDocumentStore, HttpOrderApi, OrderApi};
use crate::models::TelegramUser;
use crate::notifications::NotificationChannel;
use crate::stores::{CartStore, CatalogStore, Checkout, OrderHistory, ReferralStore, lock};

/// Owns every store, the notification channel and the session.
///
/// Cheaply cloneable via `Arc`. Starts with an empty cart and no user.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Option<StorefrontConfig>,
    notifications: NotificationChannel,
    cart: CartStore,
    catalog: CatalogStore,
    checkout: Checkout,
    history: OrderHistory,
    referrals: ReferralStore,
    user: Mutex<Option<TelegramUser>>,
}

impl AppState {
    /// Create the state with HTTP gateways from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let client = reqwest::Client::new();
        let documents = HttpDocumentStore::with_client(client.clone(), &config.gateway);
        let orders = HttpOrderApi::with_client(client, &config.gateway);
        info!(gateway = %config.gateway.documents_url, "Using HTTP gateway");

        Self::build(Some(config), Arc::new(documents), Arc::new(orders))
    }

    /// Create the state over explicit gateway implementations.
    #[must_use]
    pub fn with_gateways(documents: Arc<dyn DocumentStore>, orders: Arc<dyn OrderApi>) -> Self {
        Self::build(None, documents, orders)
    }

    fn build(
        config: Option<StorefrontConfig>,
        documents: Arc<dyn DocumentStore>,
        orders: Arc<dyn OrderApi>,
    ) -> Self {
        let notifications = NotificationChannel::new();
        let cart = CartStore::new(Arc::clone(&documents), notifications.clone());
        let catalog = CatalogStore::new(Arc::clone(&documents), notifications.clone());
        let history = OrderHistory::new(Arc::clone(&documents), notifications.clone());
        let referrals = ReferralStore::new(documents, notifications.clone());
        let checkout = Checkout::new(orders, cart.clone(), notifications.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                notifications,
                cart,
                catalog,
                checkout,
                history,
                referrals,
                user: Mutex::new(None),
            }),
        }
    }

    /// Configuration, when built from one.
    #[must_use]
    pub fn config(&self) -> Option<&StorefrontConfig> {
        self.inner.config.as_ref()
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationChannel {
        &self.inner.notifications
    }

    /// Take the pending notification, if any.
    #[must_use]
    pub fn consume_notification(&self) -> Option<Notification> {
        self.inner.notifications.consume()
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }

    #[must_use]
    pub fn history(&self) -> &OrderHistory {
        &self.inner.history
    }

    #[must_use]
    pub fn referrals(&self) -> &ReferralStore {
        &self.inner.referrals
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Record the Telegram user the Mini-App was opened by.
    pub fn set_user(&self, user: TelegramUser) {
        set_sentry_user(&user.id, user.username.as_deref());
        info!(user_id = %user.id, "Session started");
        *lock(&self.inner.user) = Some(user);
    }

    /// Forget the current user and their local cart.
    pub fn clear_user(&self) {
        clear_sentry_user();
        self.inner.cart.reset();
        *lock(&self.inner.user) = None;
    }

    #[must_use]
    pub fn user(&self) -> Option<TelegramUser> {
        lock(&self.inner.user).clone()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        lock(&self.inner.user).as_ref().map(|u| u.id.clone())
    }
}
