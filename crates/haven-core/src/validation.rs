//! # Validation Module
//!
//! Collection screening for the DesignHaven data layer.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Load path (JSON from remote or local storage)                         │
//! │  ├── decode_collection: shape check + per-entry deserialize            │
//! │  └── entry validators:  field rules (lengths, ranges)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Save path (typed in-memory collections)                               │
//! │  └── screen_*: re-run the entry validators before persisting           │
//! │                                                                         │
//! │  Both paths produce a ValidationReport: the surviving entries plus     │
//! │  every rejected entry with its index and reason. The store logs the    │
//! │  rejects; nothing is dropped without a trace.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::DeserializeOwned;

use crate::error::ValidationError;
use crate::types::{Category, OfferBanner, Order, Product, Review, User};
use crate::{
    MAX_AMOUNT, MAX_BANNER_LEN, MAX_CATEGORY_NAME_LEN, MAX_DESCRIPTION_LEN, MAX_IMAGE_URL_LEN,
    MAX_ORDER_ID_LEN, MAX_PASSWORD_LEN, MAX_PRODUCT_NAME_LEN, MAX_USER_FIELD_LEN,
};

// =============================================================================
// Validation Report
// =============================================================================

/// One rejected entry: where it sat in the incoming collection and why it
/// was refused.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub index: usize,
    pub reason: ValidationError,
}

/// Result of screening a collection: the entries that passed, in their
/// original order, plus every rejected entry with its reason.
#[derive(Debug, Clone)]
pub struct ValidationReport<T> {
    pub valid: Vec<T>,
    pub rejected: Vec<Rejected>,
}

impl<T> ValidationReport<T> {
    /// True when nothing was rejected.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Consumes the report, keeping only the surviving entries.
    pub fn into_valid(self) -> Vec<T> {
        self.valid
    }
}

/// Runs an entry validator over a typed collection.
pub fn screen<T, F>(items: Vec<T>, check: F) -> ValidationReport<T>
where
    F: Fn(&T) -> Result<(), ValidationError>,
{
    let mut valid = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match check(&item) {
            Ok(()) => valid.push(item),
            Err(reason) => rejected.push(Rejected { index, reason }),
        }
    }

    ValidationReport { valid, rejected }
}

/// Decodes a persisted JSON value into a typed, screened collection.
///
/// ## Shape Handling
/// - `null` (key absent) decodes to an empty, clean collection
/// - a non-array value rejects wholesale: empty survivors plus a single
///   [`ValidationError::MalformedCollection`] record
/// - array elements that fail to deserialize or fail the entry validator
///   are rejected individually, the rest survive
pub fn decode_collection<T, F>(
    collection: &str,
    value: serde_json::Value,
    check: F,
) -> ValidationReport<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<(), ValidationError>,
{
    let elements = match value {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Array(elements) => elements,
        other => {
            return ValidationReport {
                valid: Vec::new(),
                rejected: vec![Rejected {
                    index: 0,
                    reason: ValidationError::MalformedCollection {
                        collection: collection.to_string(),
                        reason: format!("expected an array, found {}", json_kind(&other)),
                    },
                }],
            }
        }
    };

    let mut valid = Vec::with_capacity(elements.len());
    let mut rejected = Vec::new();

    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<T>(element) {
            Ok(item) => match check(&item) {
                Ok(()) => valid.push(item),
                Err(reason) => rejected.push(Rejected { index, reason }),
            },
            Err(err) => rejected.push(Rejected {
                index,
                reason: ValidationError::InvalidFormat {
                    field: collection.to_string(),
                    reason: err.to_string(),
                },
            }),
        }
    }

    ValidationReport { valid, rejected }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// =============================================================================
// Field Helpers
// =============================================================================

fn required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn positive_id(id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "id".to_string(),
        });
    }
    Ok(())
}

fn amount_in_range(field: &str, amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount < 0.0 || amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Entry Validators
// =============================================================================

/// Validates a user entry: email, name, and password present and within
/// their length limits.
pub fn validate_user(user: &User) -> Result<(), ValidationError> {
    required("email", &user.email)?;
    max_len("email", &user.email, MAX_USER_FIELD_LEN)?;
    required("name", &user.name)?;
    max_len("name", &user.name, MAX_USER_FIELD_LEN)?;
    required("password", &user.password)?;
    max_len("password", &user.password, MAX_PASSWORD_LEN)?;
    Ok(())
}

/// Validates a category entry.
pub fn validate_category(category: &Category) -> Result<(), ValidationError> {
    positive_id(category.id)?;
    required("name", &category.name)?;
    max_len("name", &category.name, MAX_CATEGORY_NAME_LEN)?;
    required("image", &category.image)?;
    max_len("image", &category.image, MAX_IMAGE_URL_LEN)?;
    Ok(())
}

/// Validates a product entry.
pub fn validate_product(product: &Product) -> Result<(), ValidationError> {
    positive_id(product.id)?;
    required("name", &product.name)?;
    max_len("name", &product.name, MAX_PRODUCT_NAME_LEN)?;
    amount_in_range("price", product.price)?;
    required("category", &product.category)?;
    max_len("category", &product.category, MAX_CATEGORY_NAME_LEN)?;
    required("image", &product.image)?;
    max_len("image", &product.image, MAX_IMAGE_URL_LEN)?;
    if let Some(description) = &product.description {
        max_len("description", description, MAX_DESCRIPTION_LEN)?;
    }
    Ok(())
}

/// Validates an order entry. Line items are trusted as stored; only the
/// envelope fields are checked.
pub fn validate_order(order: &Order) -> Result<(), ValidationError> {
    required("id", &order.id)?;
    max_len("id", &order.id, MAX_ORDER_ID_LEN)?;
    amount_in_range("amount", order.amount)?;
    Ok(())
}

/// Validates the offer banner text length.
pub fn validate_banner(banner: &OfferBanner) -> Result<(), ValidationError> {
    max_len("text", &banner.text, MAX_BANNER_LEN)
}

/// Validates a review before it is appended to a product's review list.
pub fn validate_review(review: &Review) -> Result<(), ValidationError> {
    required("name", &review.name)?;
    max_len("name", &review.name, MAX_USER_FIELD_LEN)?;
    if !(1..=5).contains(&review.rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }
    max_len("comment", &review.comment, MAX_DESCRIPTION_LEN)?;
    Ok(())
}

// =============================================================================
// Collection Passes
// =============================================================================

pub fn screen_users(users: Vec<User>) -> ValidationReport<User> {
    screen(users, validate_user)
}

pub fn screen_categories(categories: Vec<Category>) -> ValidationReport<Category> {
    screen(categories, validate_category)
}

pub fn screen_products(products: Vec<Product>) -> ValidationReport<Product> {
    screen(products, validate_product)
}

pub fn screen_orders(orders: Vec<Order>) -> ValidationReport<Order> {
    screen(orders, validate_order)
}

/// Screens the singleton banner: an over-long text clears it.
pub fn screen_banner(banner: Option<OfferBanner>) -> Option<OfferBanner> {
    banner.filter(|banner| validate_banner(banner).is_ok())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn good_product(id: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            price: 2499.0,
            category: "Posters".to_string(),
            image: "https://example.com/p.jpg".to_string(),
            description: Some("A poster.".to_string()),
        }
    }

    #[test]
    fn test_screen_removes_exactly_the_malformed_entries() {
        let mut bad_price = good_product(2);
        bad_price.price = -1.0;
        let mut bad_name = good_product(3);
        bad_name.name = String::new();

        let report =
            screen_products(vec![good_product(1), bad_price, bad_name, good_product(4)]);

        let surviving: Vec<i64> = report.valid.iter().map(|p| p.id).collect();
        assert_eq!(surviving, vec![1, 4]);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].index, 1);
        assert_eq!(report.rejected[1].index, 2);
    }

    #[test]
    fn test_product_limits() {
        let mut product = good_product(1);
        product.description = Some("d".repeat(1001));
        assert!(validate_product(&product).is_err());

        product.description = Some("d".repeat(1000));
        assert!(validate_product(&product).is_ok());

        product.price = 1_000_000.0;
        assert!(validate_product(&product).is_ok());
        product.price = 1_000_000.5;
        assert!(validate_product(&product).is_err());
        product.price = f64::NAN;
        assert!(validate_product(&product).is_err());
    }

    #[test]
    fn test_user_requires_all_identity_fields() {
        let user = User {
            id: 1,
            name: "asha".to_string(),
            email: String::new(),
            password: "secret".to_string(),
        };
        assert!(matches!(
            validate_user(&user),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_decode_collection_null_is_empty() {
        let report =
            decode_collection::<Product, _>("products", serde_json::Value::Null, validate_product);
        assert!(report.valid.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_decode_collection_rejects_non_array_wholesale() {
        let report = decode_collection::<Product, _>(
            "products",
            json!({"not": "an array"}),
            validate_product,
        );
        assert!(report.valid.is_empty());
        assert_eq!(report.rejected.len(), 1);
        assert!(matches!(
            report.rejected[0].reason,
            ValidationError::MalformedCollection { .. }
        ));
    }

    #[test]
    fn test_decode_collection_skips_undecodable_entries() {
        let value = json!([
            {"id": 1, "name": "Poster", "price": 100.0, "category": "Posters",
             "image": "https://example.com/p.jpg"},
            {"id": "not-a-number"},
            42,
        ]);

        let report = decode_collection::<Product, _>("products", value, validate_product);
        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.rejected.len(), 2);
    }

    #[test]
    fn test_banner_screening() {
        assert!(screen_banner(Some(OfferBanner {
            text: "Sale!".to_string()
        }))
        .is_some());

        assert!(screen_banner(Some(OfferBanner {
            text: "x".repeat(201)
        }))
        .is_none());

        assert!(screen_banner(None).is_none());
    }

    #[test]
    fn test_review_rating_bounds() {
        let review = |rating| Review {
            name: "asha".to_string(),
            rating,
            comment: "Lovely print".to_string(),
            date: chrono::Utc::now(),
        };

        assert!(validate_review(&review(1)).is_ok());
        assert!(validate_review(&review(5)).is_ok());
        assert!(validate_review(&review(0)).is_err());
        assert!(validate_review(&review(6)).is_err());
    }
}
