//! Quantity reconciliation against a stock ceiling.
//!
//! Every cart mutation that touches a quantity goes through
//! [`resolve_quantity`]: a pure function from the current line state, a
//! requested delta, and the last-seen stock ceiling to a new quantity plus
//! an outcome tag. Callers render the tag directly instead of re-deriving
//! what happened.

use crate::types::product::StockCeiling;

/// Outcome tag for a quantity resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The quantity changed (or a new line may be created).
    Changed,
    /// The ceiling is already reached; an increment was refused.
    AtLimit,
    /// The quantity is already 1; a decrement was refused. Removal must be
    /// an explicit operation, never the result of decrementing to zero.
    AtFloor,
    /// No line exists and none may be created: non-positive delta, product
    /// unavailable, or known-empty stock.
    BlockedOutOfStock,
}

/// Result of [`resolve_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityResolution {
    /// The quantity the line should hold after the operation. Meaningless
    /// for [`LineOutcome::BlockedOutOfStock`] (no line exists).
    pub quantity: u32,
    pub outcome: LineOutcome,
}

/// Compute a new line quantity from a requested delta and a stock ceiling.
///
/// `current` is the existing line quantity, or `None` when the product is
/// not in the cart yet. Resulting quantities always stay within
/// `1..=ceiling`; requests past either bound report [`LineOutcome::AtLimit`]
/// or [`LineOutcome::AtFloor`] and leave the quantity where it was.
///
/// Pure and deterministic: no side effects, same inputs always give the
/// same resolution.
#[must_use]
pub fn resolve_quantity(
    current: Option<u32>,
    delta: i64,
    ceiling: StockCeiling,
    available: bool,
) -> QuantityResolution {
    let Some(current_qty) = current else {
        if delta <= 0 || !available || ceiling.is_exhausted() {
            return QuantityResolution {
                quantity: 0,
                outcome: LineOutcome::BlockedOutOfStock,
            };
        }
        return QuantityResolution {
            quantity: clamp(delta, ceiling),
            outcome: LineOutcome::Changed,
        };
    };

    if ceiling.is_exhausted() {
        // A refreshed snapshot can report zero stock for a line that is
        // already in the cart. The line keeps its quantity and further
        // increments are refused; the backend settles it at checkout.
        return QuantityResolution {
            quantity: current_qty,
            outcome: LineOutcome::AtLimit,
        };
    }

    let proposed = i64::from(current_qty).saturating_add(delta);
    let quantity = clamp(proposed, ceiling);

    let outcome = if quantity == current_qty {
        if delta > 0 {
            LineOutcome::AtLimit
        } else if delta < 0 && current_qty == 1 {
            LineOutcome::AtFloor
        } else {
            LineOutcome::Changed
        }
    } else {
        LineOutcome::Changed
    };

    QuantityResolution { quantity, outcome }
}

/// Clamp a proposed quantity into `1..=ceiling`.
fn clamp(proposed: i64, ceiling: StockCeiling) -> u32 {
    let capped = ceiling.cap(proposed.max(1));
    u32::try_from(capped).unwrap_or(u32::MAX)
}
