//! Wire types for the backend API.
//!
//! The backend's product payloads are loose: `stockQuantity` may be
//! absent, null, or a (possibly negative) number, and availability has
//! been spelled both `available` and `productAvailable` across versions.
//! Everything is normalized here, once, at the boundary - the rest of the
//! client only ever sees [`ProductSnapshot`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use copperleaf_core::{OrderId, ProductId, ProductSnapshot, StockCeiling};

/// Error body shape used by the backend (`{"error": "..."}`).
#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    pub error: String,
}

// =============================================================================
// Products
// =============================================================================

/// A product as the backend sends it, before normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default, alias = "productAvailable")]
    pub available: Option<bool>,
}

impl From<WireProduct> for ProductSnapshot {
    fn from(wire: WireProduct) -> Self {
        let stock = match wire.stock_quantity {
            // Negative figures are upstream garbage; a known figure is
            // clamped into u32 range.
            Some(n) => StockCeiling::limited(u32::try_from(n.max(0)).unwrap_or(u32::MAX)),
            None => StockCeiling::unbounded(),
        };
        Self {
            id: wire.id,
            name: wire.name,
            brand: wire.brand,
            price: wire.price.unwrap_or_default(),
            stock,
            // Absent availability has always meant "sellable".
            available: wire.available.unwrap_or(true),
        }
    }
}

/// Admin-side product update payload for `PUT /product/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<u32>,
    pub available: bool,
}

// =============================================================================
// Identity
// =============================================================================

/// Response of `GET /me`.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Response of the auth endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub admin: bool,
}

// =============================================================================
// Payments
// =============================================================================

/// One cart line in a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /payments/checkout`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    /// Rounded order total in whole currency units.
    pub amount: i64,
    pub items: Vec<CheckoutItem>,
}

/// The only status the backend uses to signal a settled payment.
pub const PAID_STATUS: &str = "PAID";

/// Response of `POST /payments/checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub status: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
}

impl PaymentStatusResponse {
    /// True only for the terminal `"PAID"` status.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == PAID_STATUS
    }
}

/// A payment order as listed by `GET /payments/all`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
