//! Integration test support for tg-store.
//!
//! [`FakeBackend`] serves the document-store REST dialect and the
//! `/api/create-order` endpoint from an in-memory store on an ephemeral port,
//! so tests can drive [`AppState`] through the real HTTP clients.
//!
//! ```rust,ignore
//! let backend = FakeBackend::start().await?;
//! let state = backend.app_state();
//! state.catalog().fetch_all().await?;
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use tg_store_core::RecordId;
use tg_store_storefront::config::StorefrontConfig;
use tg_store_storefront::gateway::{
    DocumentStore, Fields, GatewayError, InMemoryDocumentStore, ORDERS, Query,
};
use tg_store_storefront::state::AppState;

const API_KEY_HEADER: &str = "x-api-key";

// =============================================================================
// FakeBackend
// =============================================================================

/// A running fake backend. The server stops when this is dropped.
pub struct FakeBackend {
    url: Url,
    backend: Backend,
    handle: JoinHandle<()>,
}

#[derive(Clone)]
struct Backend {
    store: InMemoryDocumentStore,
    control: Arc<Control>,
}

#[derive(Default)]
struct Control {
    api_key: Option<String>,
    order_rejection: Mutex<Option<String>>,
    order_reply: Mutex<Option<(StatusCode, String)>>,
    order_requests: AtomicUsize,
}

impl FakeBackend {
    /// Start a backend that accepts any caller.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(None).await
    }

    /// Start a backend whose document routes require `x-api-key: {key}`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn with_api_key(key: &str) -> std::io::Result<Self> {
        Self::start_with(Some(key.to_string())).await
    }

    async fn start_with(api_key: Option<String>) -> std::io::Result<Self> {
        let backend = Backend {
            store: InMemoryDocumentStore::new(),
            control: Arc::new(Control {
                api_key,
                ..Control::default()
            }),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let url = Url::parse(&format!("http://{addr}/")).map_err(std::io::Error::other)?;

        let app = router(backend.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake backend stopped");
            }
        });

        Ok(Self {
            url,
            backend,
            handle,
        })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// The store behind the HTTP routes, for seeding and assertions.
    #[must_use]
    pub fn store(&self) -> &InMemoryDocumentStore {
        &self.backend.store
    }

    /// Configuration pointing both gateways at this backend.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let mut config = StorefrontConfig::local(self.url.clone());
        config.gateway.api_key = self
            .backend
            .control
            .api_key
            .clone()
            .map(SecretString::from);
        config
    }

    /// Fresh application state wired to this backend over HTTP.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        AppState::new(self.config())
    }

    /// Make `/api/create-order` fail with `400 {"error": message}`.
    ///
    /// `None` restores normal behavior.
    pub fn reject_orders(&self, message: Option<&str>) {
        *self
            .backend
            .control
            .order_rejection
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = message.map(String::from);
    }

    /// Store orders as usual but answer `/api/create-order` with a raw
    /// `status` and `body` instead of the default JSON.
    pub fn reply_to_orders(&self, status: StatusCode, body: &str) {
        *self
            .backend
            .control
            .order_reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner) =
            Some((status, body.to_string()));
    }

    /// Number of requests that reached `/api/create-order`.
    #[must_use]
    pub fn order_requests(&self) -> usize {
        self.backend.control.order_requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/collections/{collection}/documents", post(create_document))
        .route(
            "/collections/{collection}/documents/{id}",
            get(get_document)
                .patch(update_document)
                .delete(delete_document),
        )
        .route("/collections/{collection}/query", post(query_documents))
        .route("/api/create-order", post(create_order))
        .with_state(backend)
}

struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Api { status, message } => Self(
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message.unwrap_or_default(),
            ),
            other => Self(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn authorize(backend: &Backend, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = &backend.control.api_key else {
        return Ok(());
    };
    let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(ApiError(StatusCode::UNAUTHORIZED, "Invalid API key".to_string()))
    }
}

async fn create_document(
    State(backend): State<Backend>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(fields): Json<Fields>,
) -> ApiResult {
    authorize(&backend, &headers)?;
    let id = backend.store.create(&collection, fields).await?;
    Ok(Json(json!({ "id": id })))
}

async fn get_document(
    State(backend): State<Backend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult {
    authorize(&backend, &headers)?;
    let doc = backend
        .store
        .get(&collection, &RecordId::new(id))
        .await?
        .ok_or_else(|| ApiError(StatusCode::NOT_FOUND, "Document not found".to_string()))?;
    Ok(Json(json!(doc)))
}

async fn update_document(
    State(backend): State<Backend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(fields): Json<Fields>,
) -> ApiResult {
    authorize(&backend, &headers)?;
    backend
        .store
        .update(&collection, &RecordId::new(id), fields)
        .await?;
    Ok(Json(json!({})))
}

async fn delete_document(
    State(backend): State<Backend>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult {
    authorize(&backend, &headers)?;
    backend.store.delete(&collection, &RecordId::new(id)).await?;
    Ok(Json(json!({})))
}

async fn query_documents(
    State(backend): State<Backend>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(query): Json<Query>,
) -> ApiResult {
    authorize(&backend, &headers)?;
    let documents = backend.store.query(&collection, &query).await?;
    Ok(Json(json!({ "documents": documents })))
}

async fn create_order(
    State(backend): State<Backend>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    backend.control.order_requests.fetch_add(1, Ordering::SeqCst);

    let rejection = backend
        .control
        .order_rejection
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    if let Some(message) = rejection {
        return Err(ApiError(StatusCode::BAD_REQUEST, message));
    }

    let Value::Object(fields) = body else {
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            "Order must be a JSON object".to_string(),
        ));
    };
    let id = backend.store.create(ORDERS, fields).await?;

    let reply = backend
        .control
        .order_reply
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    if let Some((status, raw)) = reply {
        return Ok((status, raw).into_response());
    }
    Ok(Json(json!({ "id": id, "message": "Order created" })).into_response())
}
