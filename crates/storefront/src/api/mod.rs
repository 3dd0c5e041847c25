//! Backend API client.
//!
//! A thin `reqwest` wrapper over the storefront backend (`/api` base
//! path). The bearer token is held in a mutable slot and attached to every
//! request once set, mirroring how the session resolver hands tokens over
//! after login. Responses are read as text first so parse failures can be
//! logged with the offending body.

pub mod types;

pub use types::{
    CheckoutItem, CheckoutRequest, MeResponse, OrderRecord, PaymentStatusResponse, ProductUpdate,
};

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use copperleaf_core::{ProductId, ProductSnapshot};

use crate::config::ClientConfig;
use types::{AuthResponse, LoginRequest, RegisterRequest, WireError, WireProduct};

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with a non-success status. `message` carries
    /// the server's `error` field when one was present, otherwise a
    /// generic description.
    #[error("{message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
}

impl ApiError {
    /// Status code of a rejected request, if this is an API rejection.
    #[must_use]
    pub const fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront backend API.
///
/// Cheaply cloneable; all clones share the HTTP connection pool and the
/// bearer slot.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    bearer: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                bearer: RwLock::new(None),
            }),
        })
    }

    /// Attach a bearer token to all subsequent requests.
    pub fn set_bearer(&self, token: &str) {
        let mut bearer = self
            .inner
            .bearer
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *bearer = Some(token.to_string());
    }

    /// Stop attaching a bearer token.
    pub fn clear_bearer(&self) {
        let mut bearer = self
            .inner
            .bearer
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *bearer = None;
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        format!("{base}/{}", path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = self
            .inner
            .bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match bearer.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::rejection(status, &body));
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Send a request where only the status matters.
    async fn execute_no_body(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::rejection(status, &body));
        }
        Ok(())
    }

    /// Build the error for a non-success response, preferring the server's
    /// own `error` message.
    fn rejection(status: reqwest::StatusCode, body: &str) -> ApiError {
        let message = serde_json::from_str::<WireError>(body)
            .ok()
            .map_or_else(|| format!("request rejected with HTTP {status}"), |e| e.error);
        tracing::debug!(status = %status, message = %message, "API request rejected");
        ApiError::Api { status, message }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the product list, normalized into snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<ProductSnapshot>, ApiError> {
        let request = self.inner.client.get(self.endpoint("products"));
        let wire: Vec<WireProduct> = self.execute(request).await?;
        Ok(wire.into_iter().map(ProductSnapshot::from).collect())
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Fetch the identity behind the current bearer token.
    ///
    /// Any non-2xx response is a revalidation failure for the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<MeResponse, ApiError> {
        let request = self.inner.client.get(self.endpoint("me"));
        self.execute(request).await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error on bad credentials or transport failure; no token
    /// is set on the client in either case.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<String, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("auth/login"))
            .json(&LoginRequest {
                username,
                password: password.expose_secret(),
            });
        let response: AuthResponse = self.execute(request).await?;
        Ok(response.token)
    }

    /// Register a new account and receive its bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is taken or the request fails.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        password: &SecretString,
        admin: bool,
    ) -> Result<String, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("auth/register"))
            .json(&RegisterRequest {
                username,
                password: password.expose_secret(),
                admin,
            });
        let response: AuthResponse = self.execute(request).await?;
        Ok(response.token)
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Submit a checkout request and return the terminal payment status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, request), fields(amount = request.amount, items = request.items.len()))]
    pub async fn checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<PaymentStatusResponse, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("payments/checkout"))
            .json(request);
        self.execute(request).await
    }

    /// List all payment orders. Admin-only on the backend; callers gate on
    /// the session's role set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn all_payments(&self) -> Result<Vec<OrderRecord>, ApiError> {
        let request = self.inner.client.get(self.endpoint("payments/all"));
        self.execute(request).await
    }

    // =========================================================================
    // Admin product CRUD
    // =========================================================================

    /// Update a product. Admin-only on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .put(self.endpoint(&format!("product/{id}")))
            .json(update);
        self.execute_no_body(request).await
    }

    /// Delete a product. Admin-only on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .delete(self.endpoint(&format!("product/{id}")));
        self.execute_no_body(request).await
    }
}
