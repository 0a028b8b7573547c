//! # Storefront API
//!
//! Typed calls to the public shop endpoints.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────┬─────────────────────┐
//! │ Call                 │ Endpoint                 │ Result              │
//! ├──────────────────────┼──────────────────────────┼─────────────────────┤
//! │ fetch_products       │ GET  {base}/productos    │ Vec<Product>        │
//! │ fetch_catalog        │ GET  {base}/productos    │ ProductCatalog      │
//! │ submit_order         │ POST {base}/api/pedidos  │ OrderReceipt        │
//! └──────────────────────┴──────────────────────────┴─────────────────────┘
//! ```

use tracing::{debug, info};
use url::Url;

use tienda_core::{OrderReceipt, OrderRequest, Product, ProductCatalog};

use crate::error::{ClientError, ClientResult, FetchError};
use crate::fetcher::{CancelSignal, ResilientFetcher, RetryPolicy};
use crate::transport::{HttpRequest, HttpTransport};

/// Joins a base URL and a path with exactly one slash between them.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Checks that `base_url` is http(s) and strips trailing slashes.
pub(crate) fn normalize_base_url(base_url: &str) -> ClientResult<String> {
    let parsed = Url::parse(base_url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl(format!(
            "API URL must start with http:// or https://, got: {}",
            base_url
        )));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

/// Public storefront endpoints.
#[derive(Debug, Clone)]
pub struct StorefrontApi<T: HttpTransport> {
    base_url: String,
    fetcher: ResilientFetcher<T>,
}

impl<T: HttpTransport> StorefrontApi<T> {
    /// ## Errors
    /// `InvalidUrl` when `base_url` is not an http(s) URL.
    pub fn new(base_url: &str, fetcher: ResilientFetcher<T>) -> ClientResult<Self> {
        Ok(StorefrontApi {
            base_url: normalize_base_url(base_url)?,
            fetcher,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetcher(&self) -> &ResilientFetcher<T> {
        &self.fetcher
    }

    /// `GET {base}/productos`.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        let request = HttpRequest::get(endpoint(&self.base_url, "productos"));
        let products: Vec<Product> = self.fetcher.request(&request).await?;
        debug!(count = products.len(), "Products fetched");
        Ok(products)
    }

    /// `GET {base}/productos`, wrapped for filtering and lookup.
    pub async fn fetch_catalog(&self) -> Result<ProductCatalog, FetchError> {
        self.fetch_products().await.map(ProductCatalog::new)
    }

    /// `POST {base}/api/pedidos` with the default retry policy.
    pub async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, FetchError> {
        self.submit_order_with(order, self.fetcher.policy(), None).await
    }

    /// `POST {base}/api/pedidos` with an explicit policy and cancellation.
    pub async fn submit_order_with(
        &self,
        order: &OrderRequest,
        policy: &RetryPolicy,
        cancel: Option<&CancelSignal>,
    ) -> Result<OrderReceipt, FetchError> {
        let request = HttpRequest::post(endpoint(&self.base_url, "api/pedidos")).json(order)?;
        let receipt: OrderReceipt = self.fetcher.request_with(&request, policy, cancel).await?;
        info!(order_id = receipt.id, items = order.items.len(), "Order submitted");
        Ok(receipt)
    }
}
