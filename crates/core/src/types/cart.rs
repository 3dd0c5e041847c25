//! Cart line type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::product::ProductSnapshot;

/// A single cart entry: a product snapshot plus the chosen quantity.
///
/// Keyed by product id; a cart holds at most one line per product. The
/// quantity is only ever changed through [`crate::stock::resolve_quantity`],
/// which keeps it within `1..=ceiling`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartLine {
    /// Create a line for a product at the given quantity.
    #[must_use]
    pub const fn new(product: ProductSnapshot, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::product::StockCeiling;
    use crate::ProductId;

    fn kettle() -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(1),
            name: "Kettle".to_string(),
            brand: Some("Copperleaf".to_string()),
            price: Decimal::new(1999, 2),
            stock: StockCeiling::limited(5),
            available: true,
        }
    }

    #[test]
    fn test_line_total() {
        let line = CartLine::new(kettle(), 3);
        assert_eq!(line.line_total(), Decimal::new(5997, 2));
    }

    #[test]
    fn test_line_serde_flattens_product() {
        let line = CartLine::new(kettle(), 2);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["quantity"], 2);
        let back: CartLine = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }
}
