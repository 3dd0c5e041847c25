//! Cached product catalog.
//!
//! Product lists change rarely relative to how often the UI reads them, so
//! the catalog keeps the last normalized fetch in a `moka` cache with a
//! short TTL. `refresh` drops the cached list first, for the explicit
//! "reload products" intent.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use copperleaf_core::{ProductId, ProductSnapshot};

use crate::api::{ApiClient, ApiError};

/// Cache TTL for the product list.
const PRODUCTS_TTL: Duration = Duration::from_secs(300); // 5 minutes

const PRODUCTS_KEY: &str = "products";

/// Cached access to the backend's product list.
#[derive(Clone)]
pub struct ProductCatalog {
    api: ApiClient,
    cache: Cache<&'static str, Arc<Vec<ProductSnapshot>>>,
}

impl ProductCatalog {
    /// Create a catalog over the given API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(PRODUCTS_TTL)
            .build();
        Self { api, cache }
    }

    /// The product list, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is not cached and the fetch fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<ProductSnapshot>>, ApiError> {
        if let Some(products) = self.cache.get(PRODUCTS_KEY).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(self.api.products().await?);
        self.cache.insert(PRODUCTS_KEY, Arc::clone(&products)).await;
        Ok(products)
    }

    /// Drop the cached list and fetch it again.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; the stale cache entry is
    /// already gone in that case.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<Vec<ProductSnapshot>>, ApiError> {
        self.cache.invalidate(PRODUCTS_KEY).await;
        self.products().await
    }

    /// Look up a product snapshot by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product list cannot be fetched.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Option<ProductSnapshot>, ApiError> {
        let products = self.products().await?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }
}
