//! The storefront client facade.
//!
//! [`Storefront`] is the explicit store object UI layers hold instead of a
//! process-wide singleton: constructed once from configuration, passed by
//! reference to whatever renders it. It wires the persistence adapter, the
//! API client, the catalog, the cart store, and the session resolver, and
//! exposes the UI-intent surface (add to cart, login, checkout, ...).
//!
//! Single-threaded by construction: mutations take `&mut self` and are
//! synchronous up to and including persistence, so UI-triggered cart
//! operations apply in call order. Only the network calls suspend.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::instrument;

use copperleaf_core::{LineOutcome, ProductId, ProductSnapshot};

use crate::api::{ApiClient, OrderRecord};
use crate::cart::CartStore;
use crate::catalog::ProductCatalog;
use crate::checkout::{CheckoutCoordinator, CheckoutOutcome};
use crate::config::ClientConfig;
use crate::error::{Result, StorefrontError};
use crate::persist::{FileStore, KeyValueStore, MemoryStore, Storage};
use crate::session::{
    Identity, RevalidationFailure, SessionResolver, SessionState, VerifiedIdentity,
};

/// The storefront client: cart, session, catalog, and checkout behind one
/// handle.
pub struct Storefront {
    config: ClientConfig,
    api: ApiClient,
    catalog: ProductCatalog,
    cart: CartStore,
    session: SessionResolver,
}

impl Storefront {
    /// Build a client from configuration.
    ///
    /// Opens the storage file when one is configured (in-memory
    /// otherwise), loads the persisted cart and session, and restores the
    /// bearer token on the API client so a persisted session resumes
    /// where it left off.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file or the HTTP client cannot be
    /// opened. Corrupt storage *contents* never fail construction.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.storage_path {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store)
    }

    /// Build a client over an explicit store (used by tests and embedders
    /// that bring their own storage).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let storage = Storage::new(store);
        let api = ApiClient::new(&config)?;
        let catalog = ProductCatalog::new(api.clone());
        let cart = CartStore::load(storage.clone());
        let session = SessionResolver::load(storage);

        if !session.token().is_empty() {
            api.set_bearer(session.token());
        }

        Ok(Self {
            config,
            api,
            catalog,
            cart,
            session,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Read access to the cart.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Read access to the session.
    #[must_use]
    pub const fn session(&self) -> &SessionResolver {
        &self.session
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// The product list, cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn products(&self) -> Result<Arc<Vec<ProductSnapshot>>> {
        Ok(self.catalog.products().await?)
    }

    /// Drop the cached product list and fetch a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn refresh_products(&self) -> Result<Arc<Vec<ProductSnapshot>>> {
        Ok(self.catalog.refresh().await?)
    }

    // =========================================================================
    // Cart intents
    // =========================================================================

    /// Add one unit of a product to the cart, by id.
    ///
    /// Looks the snapshot up in the catalog so the cart clamps against the
    /// freshest ceiling we have.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched or the id is
    /// unknown. Stock refusals are not errors; they come back as the
    /// outcome tag.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_to_cart(&mut self, id: ProductId) -> Result<LineOutcome> {
        let product = self
            .catalog
            .product(id)
            .await?
            .ok_or(StorefrontError::UnknownProduct(id))?;
        Ok(self.cart.add_line(&product))
    }

    /// Set a cart line to an absolute quantity.
    #[instrument(skip(self), fields(product_id = %id, requested))]
    pub fn set_quantity(&mut self, id: ProductId, requested: u32) -> LineOutcome {
        self.cart.set_quantity(id, requested)
    }

    /// Remove a line from the cart.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn remove_from_cart(&mut self, id: ProductId) -> bool {
        self.cart.remove_line(id)
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    // =========================================================================
    // Session intents
    // =========================================================================

    /// Log in with credentials: exchange them for a token, then revalidate
    /// the token's identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential exchange fails; the token stays
    /// unset in that case.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&mut self, username: &str, password: SecretString) -> Result<SessionState> {
        let token = self.api.login(username, &password).await?;
        self.start_session(&token).await
    }

    /// Register a new account and log it in.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails; the token stays unset.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &mut self,
        username: &str,
        password: SecretString,
        admin: bool,
    ) -> Result<SessionState> {
        let token = self.api.register(username, &password, admin).await?;
        self.start_session(&token).await
    }

    /// Revalidate the current token, if any.
    ///
    /// Called at startup when a persisted token loaded the session in
    /// `Pending`. A missing token resolves to `Anonymous` immediately.
    ///
    /// # Errors
    ///
    /// Never returns an error today; the signature leaves room for
    /// transport-level retries to surface.
    pub async fn revalidate(&mut self) -> Result<SessionState> {
        let Some(ticket) = self.session.ticket() else {
            return Ok(self.session.state());
        };
        let outcome = self.fetch_identity().await;
        if self.session.apply_revalidation(&ticket, outcome) {
            self.sync_bearer();
        }
        Ok(self.session.state())
    }

    /// Log out: clear the session slots and, per the policy flag, the
    /// cart.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        self.session.logout();
        self.api.clear_bearer();
        if self.config.clear_cart_on_logout {
            self.cart.clear();
        }
    }

    async fn start_session(&mut self, token: &str) -> Result<SessionState> {
        let Some(ticket) = self.session.login(token) else {
            self.api.clear_bearer();
            return Ok(self.session.state());
        };
        self.api.set_bearer(token);

        let outcome = self.fetch_identity().await;
        if self.session.apply_revalidation(&ticket, outcome) {
            self.sync_bearer();
        }
        Ok(self.session.state())
    }

    async fn fetch_identity(&self) -> std::result::Result<VerifiedIdentity, RevalidationFailure> {
        match self.api.me().await {
            Ok(me) => Ok(VerifiedIdentity {
                user: Identity {
                    username: me.username,
                },
                roles: me.roles.into_iter().collect(),
            }),
            Err(e) => Err(RevalidationFailure {
                message: e.to_string(),
            }),
        }
    }

    /// Keep the API client's bearer slot in step with the resolver.
    fn sync_bearer(&self) {
        if self.session.token().is_empty() {
            self.api.clear_bearer();
        } else {
            self.api.set_bearer(self.session.token());
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Submit the cart for payment and interpret the terminal status.
    pub async fn checkout(&mut self) -> CheckoutOutcome {
        CheckoutCoordinator::new(&self.api)
            .submit(&mut self.cart)
            .await
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// List all payment orders. Requires the admin role.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` without issuing a request when the session
    /// lacks the admin role; otherwise propagates API errors.
    pub async fn admin_orders(&self) -> Result<Vec<OrderRecord>> {
        self.require_admin()?;
        Ok(self.api.all_payments().await?)
    }

    /// Update a product. Requires the admin role.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the session lacks the admin role;
    /// otherwise propagates API errors.
    pub async fn admin_update_product(
        &self,
        id: ProductId,
        update: &crate::api::ProductUpdate,
    ) -> Result<()> {
        self.require_admin()?;
        Ok(self.api.update_product(id, update).await?)
    }

    /// Delete a product. Requires the admin role.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the session lacks the admin role;
    /// otherwise propagates API errors.
    pub async fn admin_delete_product(&self, id: ProductId) -> Result<()> {
        self.require_admin()?;
        Ok(self.api.delete_product(id).await?)
    }

    fn require_admin(&self) -> Result<()> {
        if self.session.is_admin() {
            Ok(())
        } else {
            Err(StorefrontError::Unauthorized(
                "admin role required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use copperleaf_core::StockCeiling;

    use super::*;
    use crate::persist::MemoryStore;

    fn storefront() -> Storefront {
        Storefront::with_store(ClientConfig::for_tests(), Arc::new(MemoryStore::new())).unwrap()
    }

    fn product(id: i32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            brand: None,
            price: Decimal::new(500, 2),
            stock: StockCeiling::limited(5),
            available: true,
        }
    }

    #[test]
    fn test_fresh_storefront_is_anonymous_and_empty() {
        let store = storefront();
        assert_eq!(store.session().state(), SessionState::Anonymous);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_logout_clears_cart_per_policy() {
        let mut store = storefront();
        store.cart.add_line(&product(1));
        assert!(!store.cart().is_empty());

        store.logout();
        assert!(store.cart().is_empty());
        assert_eq!(store.session().state(), SessionState::Anonymous);
    }

    #[test]
    fn test_logout_keeps_cart_when_policy_off() {
        let mut config = ClientConfig::for_tests();
        config.clear_cart_on_logout = false;
        let mut store =
            Storefront::with_store(config, Arc::new(MemoryStore::new())).unwrap();

        store.cart.add_line(&product(1));
        store.logout();
        assert_eq!(store.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_calls_gated_locally() {
        let store = storefront();
        // Anonymous session: rejected before any request is issued.
        let err = store.admin_orders().await.unwrap_err();
        assert!(matches!(err, StorefrontError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_revalidate_without_token_stays_anonymous() {
        let mut store = storefront();
        let state = store.revalidate().await.unwrap();
        assert_eq!(state, SessionState::Anonymous);
    }
}
