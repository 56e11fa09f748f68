//! Product catalog store.

use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use tg_store_core::CategoryId;

use super::{RequestStatus, lock, tracked};
use crate::error::Result;
use crate::gateway::conversions::{convert_category, convert_product};
use crate::gateway::{CATEGORIES, Cursor, DocumentStore, PRODUCTS, Query};
use crate::models::{Category, Product, ProductListView};
use crate::notifications::NotificationChannel;

/// Products fetched per page.
pub const PRODUCTS_PAGE_SIZE: usize = 20;

/// Catalog ordering key.
const ORDER_FIELD: &str = "name";

/// Products fetched for one category.
const CATEGORY_PAGE_SIZE: usize = 50;

/// Local projection of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    /// Whether another page is likely available.
    ///
    /// True whenever the last page came back full, so a catalog whose size is
    /// an exact multiple of the page size ends with one empty fetch.
    pub has_more: bool,
    /// Position of the last product loaded by the paged listing.
    pub cursor: Option<Cursor>,
    pub status: RequestStatus,
    pub categories_status: RequestStatus,
}

/// Catalog state container. Clones share state.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogStoreInner>,
}

struct CatalogStoreInner {
    documents: Arc<dyn DocumentStore>,
    notifications: NotificationChannel,
    state: Mutex<CatalogState>,
}

impl CatalogStore {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, notifications: NotificationChannel) -> Self {
        Self {
            inner: Arc::new(CatalogStoreInner {
                documents,
                notifications,
                state: Mutex::new(CatalogState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        lock(&self.inner.state).clone()
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.inner.state).products.clone()
    }

    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        lock(&self.inner.state).categories.clone()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        lock(&self.inner.state).has_more
    }

    #[must_use]
    pub fn categories_loading(&self) -> bool {
        lock(&self.inner.state).categories_status.loading
    }

    /// Position of the last loaded product, the cursor for
    /// [`fetch_more`](Self::fetch_more).
    #[must_use]
    pub fn next_cursor(&self) -> Option<Cursor> {
        lock(&self.inner.state).cursor.clone()
    }

    /// The products screen: search filter plus 10-per-page slicing.
    #[must_use]
    pub fn visible(&self, search: &str, page: usize) -> ProductListView {
        ProductListView::build(&lock(&self.inner.state).products, search, page)
    }

    /// Load the first page ordered by name, replacing loaded products.
    ///
    /// # Errors
    ///
    /// `Network` if the gateway fails.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<Product>> {
        self.track("catalog.fetch_all", async {
            let (page, cursor) = self
                .products_page(Query::new().order_by(ORDER_FIELD).limit(PRODUCTS_PAGE_SIZE))
                .await?;

            let mut state = lock(&self.inner.state);
            state.has_more = page.len() == PRODUCTS_PAGE_SIZE;
            state.cursor = cursor;
            state.products.clone_from(&page);
            Ok(page)
        })
        .await
    }

    /// Load the page after `cursor` and append it.
    ///
    /// Products sharing a name are ordered by id, so none are skipped at a
    /// page boundary.
    ///
    /// # Errors
    ///
    /// `Network` if the gateway fails.
    #[instrument(skip(self))]
    pub async fn fetch_more(&self, cursor: &Cursor) -> Result<Vec<Product>> {
        self.track("catalog.fetch_more", async {
            let (page, next) = self
                .products_page(
                    Query::new()
                        .order_by(ORDER_FIELD)
                        .start_after(cursor.clone())
                        .limit(PRODUCTS_PAGE_SIZE),
                )
                .await?;

            let mut state = lock(&self.inner.state);
            state.has_more = page.len() == PRODUCTS_PAGE_SIZE;
            state.cursor = next.or_else(|| Some(cursor.clone()));
            state.products.extend(page.iter().cloned());
            Ok(page)
        })
        .await
    }

    /// Load up to 50 products of one category, sorted by name.
    ///
    /// Replaces loaded products and ends pagination.
    ///
    /// # Errors
    ///
    /// `Network` if the gateway fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn fetch_by_category(&self, category_id: &CategoryId) -> Result<Vec<Product>> {
        self.track("catalog.fetch_by_category", async {
            let (mut products, _) = self
                .products_page(
                    Query::new()
                        .where_eq("category", category_id.as_str())
                        .limit(CATEGORY_PAGE_SIZE),
                )
                .await?;
            products.sort_by(|a, b| a.name.cmp(&b.name));

            let mut state = lock(&self.inner.state);
            state.has_more = false;
            state.cursor = None;
            state.products.clone_from(&products);
            Ok(products)
        })
        .await
    }

    /// Load every category ordered by name.
    ///
    /// # Errors
    ///
    /// `Network` if the gateway fails.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        tracked(
            &self.inner.state,
            |s| &mut s.categories_status,
            &self.inner.notifications,
            "catalog.fetch_categories",
            async {
                let categories: Vec<Category> = self
                    .inner
                    .documents
                    .query(CATEGORIES, &Query::new().order_by(ORDER_FIELD))
                    .await?
                    .iter()
                    .map(convert_category)
                    .collect();

                lock(&self.inner.state).categories.clone_from(&categories);
                Ok(categories)
            },
        )
        .await
    }

    /// One page of products plus the cursor after its last document.
    async fn products_page(&self, query: Query) -> Result<(Vec<Product>, Option<Cursor>)> {
        let docs = self.inner.documents.query(PRODUCTS, &query).await?;
        debug!(count = docs.len(), "Fetched products");
        let cursor = docs.last().map(|doc| Cursor::after(doc, ORDER_FIELD));
        Ok((docs.iter().map(convert_product).collect(), cursor))
    }

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
}
