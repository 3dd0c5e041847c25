//! Cart commands.

use copperleaf_core::{LineOutcome, ProductId};
use copperleaf_storefront::checkout::CheckoutOutcome;
use copperleaf_storefront::state::Storefront;

/// Render a line outcome the way the storefront UI words it.
fn report_outcome(outcome: LineOutcome, name: Option<&str>) {
    match outcome {
        LineOutcome::Changed => match name {
            Some(name) => tracing::info!("{name} updated in cart"),
            None => tracing::info!("Cart updated"),
        },
        LineOutcome::AtLimit => {
            tracing::warn!("Maximum available stock reached for this item");
        }
        LineOutcome::AtFloor => {
            tracing::warn!("Quantity cannot go below 1; remove the line instead");
        }
        LineOutcome::BlockedOutOfStock => {
            tracing::warn!("This product is currently out of stock");
        }
    }
}

/// Show the cart lines and total.
pub fn show(store: &Storefront) {
    let cart = store.cart();
    if cart.is_empty() {
        tracing::info!("Your cart is empty");
        return;
    }

    for line in cart.lines() {
        tracing::info!(
            "#{} {} x{} @ {} = {}",
            line.product.id,
            line.product.name,
            line.quantity,
            line.product.price,
            line.line_total()
        );
    }
    tracing::info!("Total: {}", cart.total());
}

/// Add one unit of a product.
pub async fn add(
    store: &mut Storefront,
    product_id: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = ProductId::new(product_id);
    let outcome = store.add_to_cart(id).await?;
    let name = store.cart().line(id).map(|l| l.product.name.clone());
    report_outcome(outcome, name.as_deref());
    Ok(())
}

/// Set a line to an absolute quantity.
pub fn set(store: &mut Storefront, product_id: i32, quantity: u32) {
    let id = ProductId::new(product_id);
    let outcome = store.set_quantity(id, quantity);
    let name = store.cart().line(id).map(|l| l.product.name.clone());
    report_outcome(outcome, name.as_deref());
}

/// Remove a line.
pub fn remove(store: &mut Storefront, product_id: i32) {
    if store.remove_from_cart(ProductId::new(product_id)) {
        tracing::info!("Removed from cart");
    } else {
        tracing::info!("Not in cart");
    }
}

/// Empty the cart.
pub fn clear(store: &mut Storefront) {
    store.clear_cart();
    tracing::info!("Cart cleared");
}

/// Submit the cart for payment.
pub async fn checkout(store: &mut Storefront) {
    match store.checkout().await {
        CheckoutOutcome::Success => tracing::info!("Payment successful!"),
        CheckoutOutcome::InvalidCheckout => {
            tracing::warn!("Cart is empty or total is invalid");
        }
        CheckoutOutcome::UnknownStatus { status } => {
            tracing::warn!("Payment status unknown ({status}); please check your orders");
        }
        CheckoutOutcome::Failed { message } => tracing::error!("Checkout failed: {message}"),
    }
}
