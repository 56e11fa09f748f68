//! HTTP document store client.
//!
//! Speaks a small REST dialect:
//!
//! - `POST   {base}/collections/{c}/documents` -> `{"id": "..."}`
//! - `GET    {base}/collections/{c}/documents/{id}` -> document, `404` if absent
//! - `POST   {base}/collections/{c}/query` -> `{"documents": [...]}`
//! - `PATCH  {base}/collections/{c}/documents/{id}` (merge)
//! - `DELETE {base}/collections/{c}/documents/{id}`

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use tg_store_core::RecordId;

use super::{Document, DocumentStore, Fields, GatewayError, Query};
use crate::config::GatewayConfig;

const API_KEY_HEADER: &str = "x-api-key";

// =============================================================================
// HttpDocumentStore
// =============================================================================

/// [`DocumentStore`] backed by the remote REST gateway.
#[derive(Clone)]
pub struct HttpDocumentStore {
    inner: Arc<HttpDocumentStoreInner>,
}

struct HttpDocumentStoreInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

#[derive(Deserialize)]
struct CreatedDocument {
    id: RecordId,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpDocumentStore {
    /// Create a client for the configured gateway.
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &GatewayConfig) -> Self {
        Self {
            inner: Arc::new(HttpDocumentStoreInner {
                client,
                base_url: config.documents_url.clone(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        collection_url(&self.inner.base_url, segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key.expose_secret()),
            None => builder,
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    #[instrument(skip(self, fields), fields(collection = %collection))]
    async fn create(&self, collection: &str, fields: Fields) -> Result<RecordId, GatewayError> {
        let url = self.url(&["collections", collection, "documents"])?;
        let response = self.request(Method::POST, url).json(&fields).send().await?;
        let created: CreatedDocument = read_json(response).await?;
        debug!(id = %created.id, "Document created");
        Ok(created.id)
    }

    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn get(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<Option<Document>, GatewayError> {
        let url = self.url(&["collections", collection, "documents", id.as_str()])?;
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Document not found");
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }

    #[instrument(skip(self, query), fields(collection = %collection))]
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, GatewayError> {
        let url = self.url(&["collections", collection, "query"])?;
        let response = self.request(Method::POST, url).json(query).send().await?;
        let body: QueryResponse = read_json(response).await?;
        debug!(count = body.documents.len(), "Query returned documents");
        Ok(body.documents)
    }

    #[instrument(skip(self, fields), fields(collection = %collection, id = %id))]
    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: Fields,
    ) -> Result<(), GatewayError> {
        let url = self.url(&["collections", collection, "documents", id.as_str()])?;
        let response = self.request(Method::PATCH, url).json(&fields).send().await?;
        expect_success(response).await
    }

    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), GatewayError> {
        let url = self.url(&["collections", collection, "documents", id.as_str()])?;
        let response = self.request(Method::DELETE, url).send().await?;
        expect_success(response).await
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

/// Join `segments` onto `base`, percent-encoding each one.
pub(super) fn collection_url(base: &Url, segments: &[&str]) -> Result<Url, GatewayError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| GatewayError::Unavailable(format!("not a base URL: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Read a JSON body, turning non-success statuses into [`GatewayError::Api`].
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(api_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse gateway response"
        );
        GatewayError::Parse(e)
    })
}

async fn expect_success(response: Response) -> Result<(), GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await?;
    Err(api_error(status, &body))
}

pub(super) fn api_error(status: StatusCode, body: &str) -> GatewayError {
    tracing::error!(
        status = %status,
        body = %body.chars().take(500).collect::<String>(),
        "Gateway returned non-success status"
    );
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty());
    GatewayError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;

    #[test]
    fn test_collection_url_appends_segments() {
        let base = Url::parse("https://gateway.example.com/v1/").unwrap();
        let url = collection_url(&base, &["collections", "carts", "documents", "a b"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gateway.example.com/v1/collections/carts/documents/a%20b"
        );
    }

    #[test]
    fn test_collection_url_without_trailing_slash() {
        let base = Url::parse("http://127.0.0.1:8080").unwrap();
        let url = collection_url(&base, &["api", "create-order"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/create-order");
    }

    #[test]
    fn test_api_key_header_from_secret() {
        let base = Url::parse("http://127.0.0.1:9000/").unwrap();
        let mut gateway = StorefrontConfig::local(base.clone()).gateway;
        gateway.api_key = Some(SecretString::from("live-key-5f2c9a"));
        let store = HttpDocumentStore::new(&gateway);

        let request = store.request(Method::GET, base.clone()).build().unwrap();
        assert_eq!(
            request.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok()),
            Some("live-key-5f2c9a")
        );

        gateway.api_key = None;
        let anonymous = HttpDocumentStore::new(&gateway);
        let request = anonymous.request(Method::GET, base).build().unwrap();
        assert!(request.headers().get(API_KEY_HEADER).is_none());
    }

    #[test]
    fn test_api_error_extracts_message() {
        let err = api_error(StatusCode::BAD_REQUEST, r#"{"error":"Out of stock"}"#);
        assert_eq!(err.server_message(), Some("Out of stock"));

        let err = api_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, GatewayError::Api { status: 502, message: None }));
    }
}
