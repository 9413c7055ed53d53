//! # Cart Operations
//!
//! Shopper-side cart management. The arithmetic lives in
//! [`haven_core::Cart`]; these operations resolve products, apply the
//! change, and persist through the store.

use haven_core::{CartItem, CoreError};

use crate::error::StoreResult;
use crate::store::Store;

impl Store {
    /// Adds one unit of a product to the cart (snapshotting name, price,
    /// and image at this moment).
    pub async fn add_to_cart(&self, product_id: i64) -> StoreResult<()> {
        self.mutate(|data| {
            let product = data
                .products
                .iter()
                .find(|p| p.id == product_id)
                .cloned()
                .ok_or(CoreError::ProductNotFound(product_id))?;
            data.cart.add_product(&product);
            Ok(())
        })
        .await
    }

    /// Applies a signed quantity delta to a cart line. A delta that takes
    /// the quantity to zero or below removes the line.
    pub async fn change_cart_quantity(&self, product_id: i64, delta: i64) -> StoreResult<()> {
        self.mutate(|data| {
            data.cart.change_quantity(product_id, delta)?;
            Ok(())
        })
        .await
    }

    /// Removes a cart line.
    pub async fn remove_from_cart(&self, product_id: i64) -> StoreResult<()> {
        self.mutate(|data| {
            data.cart.remove(product_id);
            Ok(())
        })
        .await
    }

    /// Empties the cart.
    pub async fn clear_cart(&self) -> StoreResult<()> {
        self.mutate(|data| {
            data.cart.clear();
            Ok(())
        })
        .await
    }

    /// Current cart lines.
    pub fn cart_items(&self) -> Vec<CartItem> {
        self.with_data(|data| data.cart.items().to_vec())
    }

    /// Current cart subtotal (also the checkout amount).
    pub fn cart_subtotal(&self) -> f64 {
        self.with_data(|data| data.cart.subtotal())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::{StorageSettings, StoreConfig};
    use crate::store::Store;

    async fn test_store() -> Arc<Store> {
        let dir = std::env::temp_dir().join(format!("haven-cart-{}", uuid::Uuid::new_v4()));
        let config = StoreConfig {
            storage: StorageSettings { dir: Some(dir) },
            ..StoreConfig::default()
        };
        let store = Store::open(config).await.unwrap();
        store
            .save_category(None, "Posters", "https://example.com/c.jpg")
            .await
            .unwrap();
        store
            .save_product(None, "Vintage Poster", 2499.0, "Posters", "https://example.com/p.jpg", None)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_add_and_increment() {
        let store = test_store().await;
        store.add_to_cart(1).await.unwrap();
        store.add_to_cart(1).await.unwrap();

        let items = store.cart_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(store.cart_subtotal(), 4998.0);
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let store = test_store().await;
        assert!(store.add_to_cart(99).await.is_err());
        assert!(store.cart_items().is_empty());
    }

    #[tokio::test]
    async fn test_decrement_from_one_removes_line() {
        let store = test_store().await;
        store.add_to_cart(1).await.unwrap();

        store.change_cart_quantity(1, -1).await.unwrap();

        // The line must be gone, never present with quantity 0.
        assert!(store.cart_items().is_empty());
    }

    #[tokio::test]
    async fn test_cart_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("haven-cart-{}", uuid::Uuid::new_v4()));
        let config = StoreConfig {
            storage: StorageSettings { dir: Some(dir) },
            ..StoreConfig::default()
        };

        {
            let store = Store::open(config.clone()).await.unwrap();
            store
                .save_category(None, "Posters", "https://example.com/c.jpg")
                .await
                .unwrap();
            store
                .save_product(None, "Vintage Poster", 2499.0, "Posters", "https://example.com/p.jpg", None)
                .await
                .unwrap();
            store.add_to_cart(1).await.unwrap();
        }

        let reopened = Store::open(config).await.unwrap();
        let items = reopened.cart_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Vintage Poster");
    }
}
