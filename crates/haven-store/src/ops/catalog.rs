//! # Catalog Operations
//!
//! Admin-console management of categories, products, and the offer banner.
//!
//! ## Id Assignment
//! New categories and products get `max(existing ids) + 1`, so ids are
//! never reused even after deletions. Updates keep their id and replace
//! the remaining fields.

use haven_core::validation::{validate_banner, validate_category, validate_product};
use haven_core::{next_numeric_id, Category, CoreError, OfferBanner, Product, ValidationError};

use crate::error::StoreResult;
use crate::store::Store;

impl Store {
    /// Creates or updates a category.
    ///
    /// `id: None` creates a new category with the next free id; `Some(id)`
    /// updates the existing one in place.
    pub async fn save_category(
        &self,
        id: Option<i64>,
        name: &str,
        image: &str,
    ) -> StoreResult<Category> {
        self.mutate(|data| match id {
            Some(id) => {
                let index = data
                    .categories
                    .iter()
                    .position(|c| c.id == id)
                    .ok_or(CoreError::CategoryNotFound(id))?;

                let mut updated = data.categories[index].clone();
                updated.name = name.to_string();
                updated.image = image.to_string();
                validate_category(&updated).map_err(CoreError::from)?;

                data.categories[index] = updated.clone();
                Ok(updated)
            }
            None => {
                let category = Category {
                    id: next_numeric_id(data.categories.iter().map(|c| c.id)),
                    name: name.to_string(),
                    image: image.to_string(),
                };
                validate_category(&category).map_err(CoreError::from)?;

                data.categories.push(category.clone());
                Ok(category)
            }
        })
        .await
    }

    /// Deletes a category and every product filed under its name.
    pub async fn delete_category(&self, id: i64) -> StoreResult<()> {
        self.mutate(|data| {
            let index = data
                .categories
                .iter()
                .position(|c| c.id == id)
                .ok_or(CoreError::CategoryNotFound(id))?;

            // Capture the name before removal; the cascade matches on it.
            let removed = data.categories.remove(index);
            data.products.retain(|p| p.category != removed.name);
            Ok(())
        })
        .await
    }

    /// Creates or updates a product. Same id rules as [`Store::save_category`].
    pub async fn save_product(
        &self,
        id: Option<i64>,
        name: &str,
        price: f64,
        category: &str,
        image: &str,
        description: Option<String>,
    ) -> StoreResult<Product> {
        let description = description.filter(|d| !d.is_empty());

        self.mutate(|data| match id {
            Some(id) => {
                let index = data
                    .products
                    .iter()
                    .position(|p| p.id == id)
                    .ok_or(CoreError::ProductNotFound(id))?;

                let mut updated = data.products[index].clone();
                updated.name = name.to_string();
                updated.price = price;
                updated.category = category.to_string();
                updated.image = image.to_string();
                updated.description = description.clone();
                validate_product(&updated).map_err(CoreError::from)?;

                data.products[index] = updated.clone();
                Ok(updated)
            }
            None => {
                let product = Product {
                    id: next_numeric_id(data.products.iter().map(|p| p.id)),
                    name: name.to_string(),
                    price,
                    category: category.to_string(),
                    image: image.to_string(),
                    description: description.clone(),
                };
                validate_product(&product).map_err(CoreError::from)?;

                data.products.push(product.clone());
                Ok(product)
            }
        })
        .await
    }

    /// Deletes a product.
    pub async fn delete_product(&self, id: i64) -> StoreResult<()> {
        self.mutate(|data| {
            let index = data
                .products
                .iter()
                .position(|p| p.id == id)
                .ok_or(CoreError::ProductNotFound(id))?;
            data.products.remove(index);
            Ok(())
        })
        .await
    }

    /// Sets the offer banner. The text is trimmed; an empty text is
    /// rejected (use [`Store::clear_banner`] to remove the banner).
    pub async fn set_banner(&self, text: &str) -> StoreResult<OfferBanner> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "text".to_string(),
            })
            .into());
        }

        let banner = OfferBanner {
            text: text.to_string(),
        };
        validate_banner(&banner).map_err(CoreError::from)?;

        self.mutate(|data| {
            data.offer_banner = Some(banner.clone());
            Ok(banner.clone())
        })
        .await
    }

    /// Removes the offer banner.
    pub async fn clear_banner(&self) -> StoreResult<()> {
        self.mutate(|data| {
            data.offer_banner = None;
            Ok(())
        })
        .await
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
        let dir = std::env::temp_dir().join(format!("haven-catalog-{}", uuid::Uuid::new_v4()));
        let config = StoreConfig {
            storage: StorageSettings { dir: Some(dir) },
            ..StoreConfig::default()
        };
        Store::open(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_category_gets_id_one() {
        let store = test_store().await;
        let category = store
            .save_category(None, "Posters", "https://example.com/c.jpg")
            .await
            .unwrap();
        assert_eq!(category.id, 1);
    }

    #[tokio::test]
    async fn test_new_id_is_max_plus_one() {
        let store = test_store().await;
        for name in ["Posters", "Wall Art", "Digital Prints"] {
            store
                .save_category(None, name, "https://example.com/c.jpg")
                .await
                .unwrap();
        }
        // Delete id 2; the gap must not be refilled.
        store.delete_category(2).await.unwrap();

        let next = store
            .save_category(None, "Customized Designs", "https://example.com/c.jpg")
            .await
            .unwrap();
        assert_eq!(next.id, 4);
    }

    #[tokio::test]
    async fn test_update_keeps_id() {
        let store = test_store().await;
        let created = store
            .save_category(None, "Posters", "https://example.com/c.jpg")
            .await
            .unwrap();

        let updated = store
            .save_category(Some(created.id), "Poster Art", "https://example.com/c2.jpg")
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Poster Art");
        assert_eq!(store.with_data(|d| d.categories.len()), 1);
    }

    #[tokio::test]
    async fn test_delete_category_cascades_to_products() {
        let store = test_store().await;
        let posters = store
            .save_category(None, "Posters", "https://example.com/c.jpg")
            .await
            .unwrap();
        store
            .save_category(None, "Wall Art", "https://example.com/c.jpg")
            .await
            .unwrap();

        store
            .save_product(None, "Vintage Poster", 2499.0, "Posters", "https://example.com/p.jpg", None)
            .await
            .unwrap();
        store
            .save_product(None, "Abstract Canvas", 3399.0, "Wall Art", "https://example.com/p.jpg", None)
            .await
            .unwrap();

        store.delete_category(posters.id).await.unwrap();

        let remaining: Vec<String> =
            store.with_data(|d| d.products.iter().map(|p| p.category.clone()).collect());
        assert_eq!(remaining, vec!["Wall Art".to_string()]);
    }

    #[tokio::test]
    async fn test_product_ids_survive_gaps() {
        let store = test_store().await;
        for _ in 0..4 {
            store
                .save_product(None, "Print", 100.0, "Posters", "https://example.com/p.jpg", None)
                .await
                .unwrap();
        }
        store.delete_product(2).await.unwrap();

        let product = store
            .save_product(None, "Print", 100.0, "Posters", "https://example.com/p.jpg", None)
            .await
            .unwrap();
        assert_eq!(product.id, 5);
    }

    #[tokio::test]
    async fn test_invalid_product_is_rejected_without_saving() {
        let store = test_store().await;
        let result = store
            .save_product(None, "", 100.0, "Posters", "https://example.com/p.jpg", None)
            .await;
        assert!(result.is_err());
        assert!(store.with_data(|d| d.products.is_empty()));
    }

    #[tokio::test]
    async fn test_banner_set_and_clear() {
        let store = test_store().await;
        let banner = store.set_banner("  Flat 20% off this week  ").await.unwrap();
        assert_eq!(banner.text, "Flat 20% off this week");
        assert!(store.with_data(|d| d.offer_banner.is_some()));

        store.clear_banner().await.unwrap();
        assert!(store.with_data(|d| d.offer_banner.is_none()));
    }

    #[tokio::test]
    async fn test_empty_banner_rejected() {
        let store = test_store().await;
        assert!(store.set_banner("   ").await.is_err());
    }
}
