//! HTTP client for the order-creation endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use url::Url;

use super::conversions::convert_created_order;
use super::http::{api_error, collection_url};
use super::{GatewayError, OrderApi};
use crate::config::GatewayConfig;
use crate::models::{CreatedOrder, OrderPayload};

/// [`OrderApi`] posting to `{base}/api/create-order`.
#[derive(Clone)]
pub struct HttpOrderApi {
    inner: Arc<HttpOrderApiInner>,
}

struct HttpOrderApiInner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOrderApi {
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &GatewayConfig) -> Self {
        Self {
            inner: Arc::new(HttpOrderApiInner {
                client,
                base_url: config.order_api_url.clone(),
            }),
        }
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    #[instrument(skip(self, order), fields(user_id = %order.user_id, lines = order.items.len()))]
    async fn create_order(&self, order: &OrderPayload) -> Result<CreatedOrder, GatewayError> {
        let url = collection_url(&self.inner.base_url, &["api", "create-order"])?;
        let response = self.inner.client.post(url).json(order).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let created = convert_created_order(&body);
        info!(order_id = ?created.id, "Order created");
        Ok(created)
    }
}
