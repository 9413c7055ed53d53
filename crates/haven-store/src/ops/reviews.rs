//! # Review Operations
//!
//! Product reviews: free-text name, 1-5 star rating, comment. Reviews are
//! user-local (they never sync to the remote store) and append-only per
//! product.

use chrono::Utc;
use haven_core::validation::validate_review;
use haven_core::{CoreError, Review};

use crate::error::StoreResult;
use crate::store::Store;

impl Store {
    /// Appends a review under a product id.
    pub async fn add_review(
        &self,
        product_id: i64,
        name: &str,
        rating: u8,
        comment: &str,
    ) -> StoreResult<Review> {
        let review = Review {
            name: name.trim().to_string(),
            rating,
            comment: comment.to_string(),
            date: Utc::now(),
        };
        validate_review(&review).map_err(CoreError::from)?;

        self.mutate(move |data| {
            if !data.products.iter().any(|p| p.id == product_id) {
                return Err(CoreError::ProductNotFound(product_id).into());
            }
            data.reviews.entry(product_id).or_default().push(review.clone());
            Ok(review)
        })
        .await
    }

    /// Reviews for a product, oldest first.
    pub fn reviews_for(&self, product_id: i64) -> Vec<Review> {
        self.with_data(|data| data.reviews.get(&product_id).cloned().unwrap_or_default())
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
        let dir = std::env::temp_dir().join(format!("haven-reviews-{}", uuid::Uuid::new_v4()));
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
            .save_product(None, "Poster", 100.0, "Posters", "https://example.com/p.jpg", None)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_add_review() {
        let store = test_store().await;
        store
            .add_review(1, "Asha", 5, "Lovely print, fast delivery")
            .await
            .unwrap();
        store.add_review(1, "Ravi", 3, "Colors a bit dull").await.unwrap();

        let reviews = store.reviews_for(1);
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].name, "Asha");
        assert_eq!(reviews[1].rating, 3);
    }

    #[tokio::test]
    async fn test_rating_out_of_range_rejected() {
        let store = test_store().await;
        assert!(store.add_review(1, "Asha", 0, "?").await.is_err());
        assert!(store.add_review(1, "Asha", 6, "!").await.is_err());
        assert!(store.reviews_for(1).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let store = test_store().await;
        assert!(store.add_review(42, "Asha", 4, "nice").await.is_err());
    }

    #[tokio::test]
    async fn test_reviews_survive_reopen() {
        let dir = std::env::temp_dir().join(format!("haven-reviews-{}", uuid::Uuid::new_v4()));
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
                .save_product(None, "Poster", 100.0, "Posters", "https://example.com/p.jpg", None)
                .await
                .unwrap();
            store.add_review(1, "Asha", 5, "Lovely").await.unwrap();
        }

        let reopened = Store::open(config).await.unwrap();
        assert_eq!(reopened.reviews_for(1).len(), 1);
    }
}
