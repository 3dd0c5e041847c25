//! Integration tests for Copperleaf.
//!
//! The tests exercise the cart/session core end-to-end over the in-memory
//! persistence adapter: cart reconciliation against stock ceilings,
//! persistence across reloads, session revalidation fencing, and the
//! checkout pre-checks. No backend is required; everything network-bound
//! is either driven through the resolver's ticket seam or stops at a
//! local pre-check.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p copperleaf-integration-tests
//! ```

pub mod fixtures {
    //! Shared builders for test data.

    use std::sync::Arc;

    use rust_decimal::Decimal;

    use copperleaf_core::{ProductId, ProductSnapshot, StockCeiling};
    use copperleaf_storefront::persist::{MemoryStore, Storage};

    /// A fresh in-memory storage handle.
    #[must_use]
    pub fn storage() -> Storage {
        Storage::new(Arc::new(MemoryStore::new()))
    }

    /// A shareable in-memory store, for wiring several clients to the
    /// same persistence.
    #[must_use]
    pub fn shared_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    /// A product snapshot with the given id, price in cents, and stock.
    #[must_use]
    pub fn product(id: i32, price_cents: i64, stock: StockCeiling) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            brand: Some("Copperleaf".to_string()),
            price: Decimal::new(price_cents, 2),
            stock,
            available: true,
        }
    }
}
