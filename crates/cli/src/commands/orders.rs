//! Admin order listing.

use copperleaf_storefront::state::Storefront;

/// List all payment orders. The facade refuses without the admin role.
pub async fn list(store: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    let orders = store.admin_orders().await?;

    if orders.is_empty() {
        tracing::info!("No orders recorded");
        return Ok(());
    }

    for order in &orders {
        tracing::info!(
            "#{} {} {} {} by {}",
            order.id,
            order.status,
            order.amount,
            order.currency.as_deref().unwrap_or(""),
            order.username.as_deref().unwrap_or("<unknown>")
        );
    }
    Ok(())
}
