//! Product snapshot types.
//!
//! A snapshot is the client's last-seen view of a product: price,
//! availability, and the stock ceiling that bounds cart quantities. The
//! client never owns truth about stock - it clamps optimistically against
//! the snapshot and lets the backend have the final word at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Maximum quantity a cart line may hold for a product.
///
/// An unbounded ceiling means the backend reported no stock figure for the
/// product; a limit of zero means it is known to be out of stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockCeiling(Option<u32>);

impl StockCeiling {
    /// No known stock figure; quantities are not capped.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self(None)
    }

    /// A known stock figure.
    #[must_use]
    pub const fn limited(limit: u32) -> Self {
        Self(Some(limit))
    }

    /// The limit, if one is known.
    #[must_use]
    pub const fn limit(self) -> Option<u32> {
        self.0
    }

    /// True when not a single unit can be added (known limit of zero).
    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        matches!(self.0, Some(0))
    }

    /// Cap a proposed quantity at the ceiling.
    #[must_use]
    pub fn cap(self, proposed: i64) -> i64 {
        match self.0 {
            Some(limit) => proposed.min(i64::from(limit)),
            None => proposed,
        }
    }
}

/// The client's last-seen view of a product.
///
/// Immutable once read; a later snapshot of the same id supersedes
/// quantities and availability but never changes `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: Decimal,
    /// Stock ceiling from the snapshot; unbounded when the backend did not
    /// report one.
    #[serde(default, rename = "stockQuantity")]
    pub stock: StockCeiling,
    pub available: bool,
}
