//! Cart store.
//!
//! One remote record per cart line in the `carts` collection. Every mutation
//! is written remotely first and mirrored locally once the gateway confirms.

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tracing::{info, instrument};

use tg_store_core::{Notification, ProductId, RecordId, UserId};

use super::{RequestStatus, lock, require_user, tracked};
use crate::error::{Result, StoreError, add_breadcrumb};
use crate::gateway::conversions::{cart_record_fields, convert_cart_item, quantity_fields};
use crate::gateway::{CARTS, Document, DocumentStore, Query};
use crate::models::{CartItem, CartSummary, MAX_ITEM_QUANTITY, Product};
use crate::notifications::NotificationChannel;

/// Local view of the current user's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub status: RequestStatus,
}

/// Cart state container. Clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    documents: Arc<dyn DocumentStore>,
    notifications: NotificationChannel,
    state: Mutex<CartState>,
}

impl CartStore {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, notifications: NotificationChannel) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                documents,
                notifications,
                state: Mutex::new(CartState::default()),
            }),
        }
    }

    // =========================================================================
    // Read Accessors
    // =========================================================================

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        lock(&self.inner.state).clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        lock(&self.inner.state).items.clone()
    }

    /// Whether the product already has a line in the local cart.
    #[must_use]
    pub fn contains_product(&self, product_id: &ProductId) -> bool {
        lock(&self.inner.state)
            .items
            .iter()
            .any(|item| &item.product_id == product_id)
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(&lock(&self.inner.state).items)
    }

    /// Drop local state without touching the gateway.
    pub(crate) fn reset(&self) {
        *lock(&self.inner.state) = CartState::default();
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Add a product with quantity 1.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank user id, `DuplicateItem` if the product is
    /// already in the user's cart, `Network` if the gateway fails.
    #[instrument(skip(self, product), fields(user_id = %user_id, product_id = %product.id))]
    pub async fn add(&self, user_id: &UserId, product: &Product) -> Result<CartItem> {
        self.track("cart.add", async {
            require_user(user_id)?;

            let existing = self
                .inner
                .documents
                .query(
                    CARTS,
                    &Query::new()
                        .where_eq("userId", user_id.as_str())
                        .where_eq("productId", product.id.as_str())
                        .limit(1),
                )
                .await?;
            if !existing.is_empty() {
                return Err(StoreError::DuplicateItem(product.id.clone()));
            }

            let fields = cart_record_fields(user_id, product);
            let id = self.inner.documents.create(CARTS, fields.clone()).await?;
            let item = convert_cart_item(&Document { id, fields });

            lock(&self.inner.state).items.push(item.clone());

            add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));
            info!(record_id = %item.id, "Added to cart");
            self.inner
                .notifications
                .enqueue(Notification::success(format!("{} added to cart", product.name)));
            Ok(item)
        })
        .await
    }

    /// Load every cart record of the user, replacing local state.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank user id, `Network` if the gateway fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn fetch(&self, user_id: &UserId) -> Result<Vec<CartItem>> {
        self.track("cart.fetch", async {
            require_user(user_id)?;

            let items: Vec<CartItem> = self
                .user_records(user_id)
                .await?
                .iter()
                .map(convert_cart_item)
                .collect();

            lock(&self.inner.state).items.clone_from(&items);
            Ok(items)
        })
        .await
    }

    /// Delete one cart line.
    ///
    /// # Errors
    ///
    /// `ItemNotFound` if the user has no record with this id, `Network` if
    /// the gateway fails.
    #[instrument(skip(self), fields(record_id = %id, user_id = %user_id))]
    pub async fn remove(&self, id: &RecordId, user_id: &UserId) -> Result<()> {
        self.track("cart.remove", async {
            require_user(user_id)?;
            self.find_record(id, user_id).await?;

            self.inner.documents.delete(CARTS, id).await?;

            lock(&self.inner.state).items.retain(|item| &item.id != id);
            add_breadcrumb("cart", "Removed from cart", Some(&[("record_id", id.as_str())]));
            Ok(())
        })
        .await
    }

    /// Delete every cart line of the user.
    ///
    /// Deletes run concurrently. Local state is emptied even if some of them
    /// fail; the first failure is returned and nothing is rolled back.
    ///
    /// # Errors
    ///
    /// `Network` if listing or any delete fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear(&self, user_id: &UserId) -> Result<()> {
        self.track("cart.clear", async {
            require_user(user_id)?;

            let records = self.user_records(user_id).await?;
            let deletes = records
                .iter()
                .map(|doc| self.inner.documents.delete(CARTS, &doc.id));
            let results = join_all(deletes).await;

            lock(&self.inner.state).items.clear();

            let failed = results.iter().filter(|r| r.is_err()).count();
            if failed > 0 {
                tracing::warn!(failed, total = results.len(), "Some cart deletes failed");
            }
            results.into_iter().collect::<std::result::Result<Vec<()>, _>>()?;

            info!(removed = records.len(), "Cart cleared");
            Ok(())
        })
        .await
    }

    /// Set the quantity of one cart line.
    ///
    /// # Errors
    ///
    /// `Validation` if `quantity` is outside 1..=100 or the user id is blank,
    /// `ItemNotFound` if the user has no record with this id, `Network` if the
    /// gateway fails.
    #[instrument(skip(self), fields(record_id = %id, user_id = %user_id))]
    pub async fn set_quantity(&self, id: &RecordId, user_id: &UserId, quantity: u32) -> Result<()> {
        self.track("cart.set_quantity", async {
            require_user(user_id)?;
            if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
                return Err(StoreError::validation(format!(
                    "Quantity must be between 1 and {MAX_ITEM_QUANTITY}"
                )));
            }
            self.find_record(id, user_id).await?;

            self.inner
                .documents
                .update(CARTS, id, quantity_fields(quantity))
                .await?;

            if let Some(item) = lock(&self.inner.state)
                .items
                .iter_mut()
                .find(|item| &item.id == id)
            {
                item.quantity = quantity;
            }
            Ok(())
        })
        .await
    }

    /// Raise the quantity by one.
    ///
    /// # Errors
    ///
    /// Same as [`set_quantity`](Self::set_quantity).
    pub async fn increment(&self, id: &RecordId, quantity: u32, user_id: &UserId) -> Result<()> {
        self.set_quantity(id, user_id, quantity.saturating_add(1))
            .await
    }

    /// Lower the quantity by one, removing the line when it would reach zero.
    ///
    /// # Errors
    ///
    /// Same as [`set_quantity`](Self::set_quantity) or [`remove`](Self::remove).
    pub async fn decrement(&self, id: &RecordId, quantity: u32, user_id: &UserId) -> Result<()> {
        if quantity > 1 {
            self.set_quantity(id, user_id, quantity - 1).await
        } else {
            self.remove(id, user_id).await
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn track<T>(
        &self,
        name: &'static str,
        operation: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tracked(
            &self.inner.state,
            |s| &mut s.status,
            &self.inner.notifications,
            name,
            operation,
        )
        .await
    }

    async fn user_records(&self, user_id: &UserId) -> Result<Vec<Document>> {
        Ok(self
            .inner
            .documents
            .query(CARTS, &Query::new().where_eq("userId", user_id.as_str()))
            .await?)
    }

    async fn find_record(&self, id: &RecordId, user_id: &UserId) -> Result<Document> {
        self.user_records(user_id)
            .await?
            .into_iter()
            .find(|doc| &doc.id == id)
            .ok_or_else(|| StoreError::ItemNotFound(id.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;
    use tg_store_core::{Price, Severity};

    use super::*;
    use crate::gateway::{GatewayError, InMemoryDocumentStore, MockDocumentStore};

    fn product(id: &str, name: &str, price_minor: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::from_minor(price_minor).unwrap(),
            image: vec![format!("https://cdn.example.com/{id}.png")],
            quantity: 50,
            description: None,
            category: None,
        }
    }

    fn store() -> (CartStore, InMemoryDocumentStore, NotificationChannel) {
        let documents = InMemoryDocumentStore::new();
        let channel = NotificationChannel::new();
        let cart = CartStore::new(Arc::new(documents.clone()), channel.clone());
        (cart, documents, channel)
    }

    #[tokio::test]
    async fn test_add_then_fetch_yields_one_item() -> TestResult {
        let (cart, _, channel) = store();
        let user = UserId::new("42");

        cart.add(&user, &product("p-1", "Widget", 1000)).await?;
        let items = cart.fetch(&user).await?;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, ProductId::new("p-1"));
        assert_eq!(items[0].quantity, 1);
        assert_eq!(
            channel.consume().map(|n| n.severity),
            Some(Severity::Success)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_add_twice_is_duplicate() -> TestResult {
        let (cart, documents, channel) = store();
        let user = UserId::new("42");
        let widget = product("p-1", "Widget", 1000);

        cart.add(&user, &widget).await?;
        let err = cart.add(&user, &widget).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateItem(ref id) if id == &widget.id));
        assert_eq!(documents.len(CARTS), 1);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(
            channel.consume(),
            Some(Notification::info("Product already in cart"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_same_product_for_different_users() -> TestResult {
        let (cart, documents, _) = store();
        let widget = product("p-1", "Widget", 1000);

        cart.add(&UserId::new("1"), &widget).await?;
        cart.add(&UserId::new("2"), &widget).await?;

        assert_eq!(documents.len(CARTS), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_without_user_makes_no_call() {
        let mut documents = MockDocumentStore::new();
        documents.expect_query().never();
        documents.expect_create().never();
        let cart = CartStore::new(Arc::new(documents), NotificationChannel::new());

        let err = cart
            .add(&UserId::new(""), &product("p-1", "Widget", 1000))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(
            cart.snapshot().status.error.as_deref(),
            Some("User ID is missing")
        );
    }

    #[tokio::test]
    async fn test_decrement_at_one_removes() -> TestResult {
        let (cart, documents, _) = store();
        let user = UserId::new("42");
        let item = cart.add(&user, &product("p-1", "Widget", 1000)).await?;

        cart.decrement(&item.id, 1, &user).await?;

        assert!(cart.items().is_empty());
        assert!(documents.is_empty(CARTS));
        Ok(())
    }

    #[tokio::test]
    async fn test_increment_then_decrement_round_trips() -> TestResult {
        let (cart, _, _) = store();
        let user = UserId::new("42");
        let item = cart.add(&user, &product("p-1", "Widget", 1000)).await?;

        cart.increment(&item.id, 1, &user).await?;
        assert_eq!(cart.items()[0].quantity, 2);

        cart.decrement(&item.id, 2, &user).await?;
        assert_eq!(cart.items()[0].quantity, 1);

        let remote = cart.fetch(&user).await?;
        assert_eq!(remote[0].quantity, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_quantity_rejects_out_of_range() {
        let mut documents = MockDocumentStore::new();
        documents.expect_query().never();
        documents.expect_update().never();
        let cart = CartStore::new(Arc::new(documents), NotificationChannel::new());
        let user = UserId::new("42");
        let id = RecordId::new("rec-1");

        assert!(matches!(
            cart.set_quantity(&id, &user, 0).await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            cart.set_quantity(&id, &user, 101).await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            cart.increment(&id, 100, &user).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_of_other_users_record_is_not_found() -> TestResult {
        let (cart, documents, _) = store();
        let item = cart
            .add(&UserId::new("1"), &product("p-1", "Widget", 1000))
            .await?;

        let err = cart.remove(&item.id, &UserId::new("2")).await.unwrap_err();

        assert!(matches!(err, StoreError::ItemNotFound(_)));
        assert_eq!(documents.len(CARTS), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_removes_everything() -> TestResult {
        let (cart, documents, _) = store();
        let user = UserId::new("42");
        for i in 0..4 {
            cart.add(&user, &product(&format!("p-{i}"), "Item", 100)).await?;
        }
        cart.add(&UserId::new("7"), &product("p-0", "Item", 100)).await?;

        cart.clear(&user).await?;

        assert!(cart.items().is_empty());
        assert!(cart.fetch(&user).await?.is_empty());
        assert_eq!(documents.len(CARTS), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_partial_failure_still_empties_local_state() {
        let mut documents = MockDocumentStore::new();
        documents.expect_query().returning(|_, _| {
            Ok(vec![
                Document {
                    id: RecordId::new("a"),
                    fields: json!({"productId": "p-1"}).as_object().cloned().unwrap(),
                },
                Document {
                    id: RecordId::new("b"),
                    fields: json!({"productId": "p-2"}).as_object().cloned().unwrap(),
                },
            ])
        });
        documents
            .expect_delete()
            .withf(|_, id| id.as_str() == "a")
            .returning(|_, _| Ok(()));
        documents
            .expect_delete()
            .withf(|_, id| id.as_str() == "b")
            .returning(|_, _| Err(GatewayError::Unavailable("timeout".to_string())));
        let channel = NotificationChannel::new();
        let cart = CartStore::new(Arc::new(documents), channel.clone());
        let user = UserId::new("42");
        cart.fetch(&user).await.unwrap();
        assert_eq!(cart.items().len(), 2);

        let err = cart.clear(&user).await.unwrap_err();

        assert!(matches!(err, StoreError::Network(_)));
        assert!(cart.items().is_empty());
        let state = cart.snapshot();
        assert!(!state.status.loading);
        assert!(state.status.error.is_some());
        assert_eq!(
            channel.consume().map(|n| n.severity),
            Some(Severity::Error)
        );
    }

    #[tokio::test]
    async fn test_summary_and_contains_product() -> TestResult {
        let (cart, _, _) = store();
        let user = UserId::new("42");
        let item = cart.add(&user, &product("p-1", "Widget", 1000)).await?;
        cart.set_quantity(&item.id, &user, 3).await?;
        cart.add(&user, &product("p-2", "Gadget", 250)).await?;

        let summary = cart.summary();
        assert_eq!(summary.total_price.amount(), Decimal::new(3250, 2));
        assert_eq!(summary.total_quantity, 4);
        assert!(cart.contains_product(&ProductId::new("p-1")));
        assert!(!cart.contains_product(&ProductId::new("p-3")));
        Ok(())
    }
}
