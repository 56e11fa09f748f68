//! Remote data gateway: the document store and the order service.
//!
//! # Architecture
//!
//! - Stores talk to the backend only through the [`DocumentStore`] and
//!   [`OrderApi`] traits, held as `Arc<dyn _>`
//! - The backend is the source of truth - NO caching, NO offline sync
//! - Loosely-typed documents are turned into domain models in
//!   [`conversions`], default-filling absent fields
//!
//! # Backends
//!
//! - [`HttpDocumentStore`] / [`HttpOrderApi`] - `reqwest` clients for the
//!   deployed backend
//! - [`InMemoryDocumentStore`] - same query semantics, no network; used by
//!   tests and local demos
//! - `MockDocumentStore` / `MockOrderApi` - `mockall` mocks

pub mod conversions;
mod http;
mod memory;
mod orders;
pub mod query;

pub use http::HttpDocumentStore;
pub use memory::InMemoryDocumentStore;
pub use orders::HttpOrderApi;
pub use query::{Cursor, Direction, Document, Fields, Filter, OrderBy, Query};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use tg_store_core::RecordId;

use crate::models::{CreatedOrder, OrderPayload};

/// Collection holding one record per cart line.
pub const CARTS: &str = "carts";
/// Collection holding the product catalog.
pub const PRODUCTS: &str = "products";
/// Collection holding product categories.
pub const CATEGORIES: &str = "categories";
/// Collection holding submitted orders.
pub const ORDERS: &str = "orders";
/// Collection holding Telegram user profiles, keyed by Telegram id.
pub const USERS: &str = "users";

/// Errors that can occur when talking to the remote gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned a non-success status.
    #[error("API error: {status}{}", format_server_message(.message))]
    Api {
        status: u16,
        /// Human-readable `error` field from the response body, if any.
        message: Option<String>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend could not serve the request.
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// The server-provided message, if the gateway sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

fn format_server_message(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" - {m}"))
        .unwrap_or_default()
}

/// Request/response access to a document database.
#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return its assigned id.
    async fn create(&self, collection: &str, fields: Fields) -> Result<RecordId, GatewayError>;

    /// Fetch one document by id.
    async fn get(&self, collection: &str, id: &RecordId)
    -> Result<Option<Document>, GatewayError>;

    /// Run a query over a collection.
    async fn query(&self, collection: &str, query: &Query)
    -> Result<Vec<Document>, GatewayError>;

    /// Merge `fields` into an existing document.
    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Fields,
    ) -> Result<(), GatewayError>;

    /// Delete a document.
    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), GatewayError>;
}

/// The REST order-creation endpoint.
#[automock]
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Submit an order.
    async fn create_order(&self, order: &OrderPayload) -> Result<CreatedOrder, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_message() {
        let err = GatewayError::Api {
            status: 422,
            message: Some("Product out of stock".to_string()),
        };
        assert_eq!(err.to_string(), "API error: 422 - Product out of stock");
        assert_eq!(err.server_message(), Some("Product out of stock"));
    }

    #[test]
    fn test_api_error_display_without_message() {
        let err = GatewayError::Api {
            status: 503,
            message: None,
        };
        assert_eq!(err.to_string(), "API error: 503");
        assert_eq!(err.server_message(), None);
    }
}
