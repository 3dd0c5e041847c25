//! Product listing command.

use copperleaf_storefront::state::Storefront;

/// List the catalog, optionally bypassing the cache.
pub async fn list(store: &Storefront, refresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    let products = if refresh {
        store.refresh_products().await?
    } else {
        store.products().await?
    };

    if products.is_empty() {
        tracing::info!("No products available");
        return Ok(());
    }

    for product in products.iter() {
        let stock = product
            .stock
            .limit()
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string());
        let availability = if product.available { "" } else { " [unavailable]" };
        tracing::info!(
            "#{} {} - {} (stock: {}){}",
            product.id,
            product.name,
            product.price,
            stock,
            availability
        );
    }
    Ok(())
}
