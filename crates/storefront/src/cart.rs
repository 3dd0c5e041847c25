//! The cart store.
//!
//! Owns the ordered cart lines and is the only writer of the persisted
//! cart blob. Every quantity change goes through
//! [`copperleaf_core::resolve_quantity`]; every mutation that changes
//! state writes the whole cart back to storage before returning, so a
//! crash right after a call never loses that call's effect.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use copperleaf_core::{CartLine, LineOutcome, ProductId, ProductSnapshot, resolve_quantity};

use crate::persist::{Storage, keys};

/// Persisted cart blob format version.
const CART_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope around the persisted lines, so future shape changes
/// can migrate instead of silently misparsing.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCart {
    version: u32,
    lines: Vec<CartLine>,
}

/// The shopping cart: an ordered sequence of lines, one per product id.
///
/// Insertion order is display order. The store owns the sequence
/// exclusively; callers read through [`Self::lines`] and mutate through
/// the operations below, each of which reports a [`LineOutcome`] the UI
/// can render directly.
pub struct CartStore {
    lines: Vec<CartLine>,
    storage: Storage,
}

impl CartStore {
    /// Load the cart from storage.
    ///
    /// A missing, corrupt, or wrong-version blob starts an empty cart;
    /// loading never fails outward.
    #[must_use]
    pub fn load(storage: Storage) -> Self {
        let lines = storage.get(keys::CART).map_or_else(Vec::new, |raw| {
            match serde_json::from_str::<PersistedCart>(&raw) {
                Ok(cart) if cart.version == CART_SCHEMA_VERSION => cart.lines,
                Ok(cart) => {
                    tracing::warn!(version = cart.version, "unknown cart version; starting empty");
                    Vec::new()
                }
                // Pre-versioning blobs were a bare line array; migrate them.
                Err(_) => match serde_json::from_str::<Vec<CartLine>>(&raw) {
                    Ok(lines) => lines,
                    Err(e) => {
                        tracing::warn!(error = %e, "cart blob unreadable; starting empty");
                        Vec::new()
                    }
                },
            }
        });
        Self { lines, storage }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The cart lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if it is in the cart.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == id)
    }

    /// Number of lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of a product.
    ///
    /// An existing line is bumped by one and takes over the snapshot's
    /// refreshed stock ceiling; otherwise a new line is appended at
    /// quantity 1. On `AtLimit` or `BlockedOutOfStock` the cart is
    /// untouched.
    pub fn add_line(&mut self, product: &ProductSnapshot) -> LineOutcome {
        let existing = self.lines.iter().position(|l| l.product.id == product.id);
        let current = existing.and_then(|i| self.lines.get(i)).map(|l| l.quantity);

        let resolution = resolve_quantity(current, 1, product.stock, product.available);
        if resolution.outcome != LineOutcome::Changed {
            return resolution.outcome;
        }

        match existing {
            Some(index) => {
                if let Some(line) = self.lines.get_mut(index) {
                    // The fresh snapshot supersedes the stored one.
                    line.product = product.clone();
                    line.quantity = resolution.quantity;
                }
            }
            None => self
                .lines
                .push(CartLine::new(product.clone(), resolution.quantity)),
        }
        self.persist();
        resolution.outcome
    }

    /// Set a line to an absolute quantity.
    ///
    /// The request is expressed as a delta against the current quantity
    /// and resolved against the line's stored ceiling. Addressing a
    /// product that is not in the cart reports `BlockedOutOfStock`: there
    /// is no snapshot to size a new line against.
    pub fn set_quantity(&mut self, id: ProductId, requested: u32) -> LineOutcome {
        let Some(index) = self.lines.iter().position(|l| l.product.id == id) else {
            return LineOutcome::BlockedOutOfStock;
        };
        let Some(line) = self.lines.get(index) else {
            return LineOutcome::BlockedOutOfStock;
        };

        let delta = i64::from(requested) - i64::from(line.quantity);
        let resolution = resolve_quantity(
            Some(line.quantity),
            delta,
            line.product.stock,
            line.product.available,
        );

        if resolution.outcome == LineOutcome::Changed {
            if let Some(line) = self.lines.get_mut(index)
                && line.quantity != resolution.quantity
            {
                line.quantity = resolution.quantity;
                self.persist();
            }
        }
        resolution.outcome
    }

    /// Remove a line unconditionally.
    ///
    /// Returns whether a line was removed; removing an absent id is a
    /// no-op and does not touch storage.
    pub fn remove_line(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != id);
        let removed = self.lines.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Empty the cart and persist the empty sequence.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Write the whole cart back to storage.
    fn persist(&self) {
        match serde_json::to_string(&PersistedCart {
            version: CART_SCHEMA_VERSION,
            lines: self.lines.clone(),
        }) {
            Ok(raw) => self.storage.set(keys::CART, &raw),
            Err(e) => tracing::warn!(error = %e, "cart serialization failed; not persisted"),
        }
    }
}
