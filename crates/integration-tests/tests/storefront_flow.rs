//! End-to-end flows through the `Storefront` facade.
//!
//! Everything here stops before the network: checkout is rejected by the
//! local pre-check and admin calls are gated by the local role check.

use std::sync::Arc;

use rust_decimal::Decimal;

use copperleaf_core::{LineOutcome, ProductId, StockCeiling};
use copperleaf_integration_tests::fixtures::{product, shared_store};
use copperleaf_storefront::StorefrontError;
use copperleaf_storefront::cart::CartStore;
use copperleaf_storefront::checkout::CheckoutOutcome;
use copperleaf_storefront::config::ClientConfig;
use copperleaf_storefront::persist::Storage;
use copperleaf_storefront::state::Storefront;

fn storefront_over(store: Arc<copperleaf_storefront::persist::MemoryStore>) -> Storefront {
    Storefront::with_store(ClientConfig::for_tests(), store).expect("client construction")
}

#[tokio::test]
async fn empty_cart_checkout_is_rejected_locally() {
    let mut store = storefront_over(shared_store());
    assert_eq!(store.checkout().await, CheckoutOutcome::InvalidCheckout);
}

#[tokio::test]
async fn zero_total_checkout_is_rejected_locally() {
    let shared = shared_store();

    // Seed a cart holding one zero-priced line.
    {
        let mut cart = CartStore::load(Storage::new(
            Arc::clone(&shared) as Arc<dyn copperleaf_storefront::persist::KeyValueStore>,
        ));
        cart.add_line(&product(1, 0, StockCeiling::unbounded()));
    }

    let mut store = storefront_over(shared);
    assert_eq!(store.cart().len(), 1);
    assert_eq!(store.checkout().await, CheckoutOutcome::InvalidCheckout);
    // The cart is untouched for the user to fix.
    assert_eq!(store.cart().len(), 1);
}

#[tokio::test]
async fn admin_listing_requires_the_role() {
    let store = storefront_over(shared_store());
    match store.admin_orders().await {
        Err(StorefrontError::Unauthorized(_)) => {}
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[test]
fn cart_state_flows_across_clients_sharing_storage() {
    let shared = shared_store();

    {
        let mut cart = CartStore::load(Storage::new(
            Arc::clone(&shared) as Arc<dyn copperleaf_storefront::persist::KeyValueStore>,
        ));
        let p = product(3, 1500, StockCeiling::limited(4));
        assert_eq!(cart.add_line(&p), LineOutcome::Changed);
        assert_eq!(cart.set_quantity(p.id, 4), LineOutcome::Changed);
    }

    let store = storefront_over(shared);
    let line = store.cart().line(ProductId::new(3)).expect("persisted line");
    assert_eq!(line.quantity, 4);
    assert_eq!(store.cart().total(), Decimal::new(6000, 2));
}

#[test]
fn logout_policy_controls_cart_clearing() {
    // Policy on (the default): the cart goes with the session.
    let shared = shared_store();
    {
        let mut cart = CartStore::load(Storage::new(
            Arc::clone(&shared) as Arc<dyn copperleaf_storefront::persist::KeyValueStore>,
        ));
        cart.add_line(&product(1, 1000, StockCeiling::unbounded()));
    }
    let mut store = storefront_over(shared);
    assert_eq!(store.cart().len(), 1);
    store.logout();
    assert!(store.cart().is_empty());

    // Policy off: the cart survives logout.
    let mut config = ClientConfig::for_tests();
    config.clear_cart_on_logout = false;
    let shared = shared_store();
    {
        let mut cart = CartStore::load(Storage::new(
            Arc::clone(&shared) as Arc<dyn copperleaf_storefront::persist::KeyValueStore>,
        ));
        cart.add_line(&product(1, 1000, StockCeiling::unbounded()));
    }
    let mut store = Storefront::with_store(config, shared).expect("client construction");
    store.logout();
    assert_eq!(store.cart().len(), 1, "cart survives logout with the policy off");
}
