//! Checkout coordination.
//!
//! A thin layer above the cart: build the line-item request, pre-check the
//! amount locally, submit, and interpret the terminal payment status. Only
//! the `"PAID"` status clears the cart; anything else leaves it intact so
//! the user can retry or verify manually.

use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::ToPrimitive;
use tracing::instrument;

use crate::api::{ApiClient, CheckoutItem, CheckoutRequest};
use crate::cart::CartStore;

/// Outcome of a checkout attempt, rendered directly by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Payment settled; the cart has been cleared.
    Success,
    /// The cart is empty or rounds to a non-positive amount. Decided
    /// locally; no request was issued.
    InvalidCheckout,
    /// The backend answered with a status other than `"PAID"`. The cart is
    /// left intact.
    UnknownStatus { status: String },
    /// The request failed in transport or was rejected. Carries the
    /// server's message when one was present.
    Failed { message: String },
}

/// Turns the current cart into a payment request.
pub struct CheckoutCoordinator<'a> {
    api: &'a ApiClient,
}

impl<'a> CheckoutCoordinator<'a> {
    /// Create a coordinator over the given API client.
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Build the request for the current cart, or `None` when it would be
    /// invalid (empty cart or non-positive rounded amount).
    #[must_use]
    pub fn build_request(cart: &CartStore) -> Option<CheckoutRequest> {
        if cart.is_empty() {
            return None;
        }

        // Half rounds away from zero, the rounding users see on the total.
        let amount = cart
            .total()
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(0);
        if amount <= 0 {
            return None;
        }

        let items = cart
            .lines()
            .iter()
            .map(|line| CheckoutItem {
                product_id: line.product.id,
                quantity: line.quantity,
            })
            .collect();

        Some(CheckoutRequest { amount, items })
    }

    /// Submit the cart for payment.
    ///
    /// On `Success` the cart is cleared (and the empty sequence
    /// persisted); on every other outcome it is untouched.
    #[instrument(skip(self, cart), fields(lines = cart.len()))]
    pub async fn submit(&self, cart: &mut CartStore) -> CheckoutOutcome {
        let Some(request) = Self::build_request(cart) else {
            return CheckoutOutcome::InvalidCheckout;
        };

        match self.api.checkout(&request).await {
            Ok(response) if response.is_paid() => {
                tracing::info!(amount = request.amount, "payment settled");
                cart.clear();
                CheckoutOutcome::Success
            }
            Ok(response) => {
                tracing::warn!(status = %response.status, "payment status not terminal");
                CheckoutOutcome::UnknownStatus {
                    status: response.status,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "checkout failed");
                CheckoutOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
