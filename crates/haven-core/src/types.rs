//! # Domain Types
//!
//! Core domain types for the DesignHaven storefront data layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │     Product     │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (max+1)     │   │  id (max+1)     │   │  id ("ORD"+ms)  │       │
//! │  │  name           │   │  name, price    │   │  items (frozen) │       │
//! │  │  image          │   │  category (name)│   │  status, amount │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │   OrderStatus   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name (unique,  │   │  Ordered        │   │  Cod            │       │
//! │  │  case-insens.)  │   │  Packing        │   │  Online         │       │
//! │  │  email, password│   │  OutForDelivery │   └─────────────────┘       │
//! │  └─────────────────┘   │  Delivered      │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Compatibility
//! Serde attributes pin every field to the JSON the storefront already
//! persists (`userId`, `paymentMethod`, `"out for delivery"`, ...), so a
//! collection written by one client revision loads cleanly in the next.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Catalog
// =============================================================================

/// A product category shown on the storefront landing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    /// Numeric id, assigned as `max(existing ids) + 1`.
    pub id: i64,

    /// Display name; products reference categories by this name.
    pub name: String,

    /// Image URL for the category card.
    pub image: String,
}

/// A product available for purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Numeric id, assigned as `max(existing ids) + 1`.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Price in rupees. Non-negative, capped at 1,000,000.
    pub price: f64,

    /// Name of the category this product belongs to.
    /// This is a soft reference: nothing enforces that a matching
    /// [`Category`] exists.
    pub category: String,

    /// Image URL.
    pub image: String,

    /// Optional long-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The singleton promotional banner, present or absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OfferBanner {
    /// Banner text, at most 200 characters.
    pub text: String,
}

// =============================================================================
// Accounts
// =============================================================================

/// A registered storefront account.
///
/// Stored with a plaintext password and compared verbatim at login. That is
/// the documented behavior of this system; the data layer reproduces it and
/// nothing here should be mistaken for an auth scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    /// Millisecond timestamp taken at registration time.
    pub id: i64,

    /// Unique display name (case-insensitive).
    pub name: String,

    /// Email address, also usable as the login identifier.
    pub email: String,

    /// Plaintext password.
    pub password: String,
}

/// The currently logged-in identity, persisted under `currentUser`.
///
/// Deliberately excludes the password: this record is what pages read to
/// decide navigation state and order ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
}

impl SessionUser {
    /// True when this session belongs to the reserved admin account.
    pub fn is_admin(&self) -> bool {
        self.name.eq_ignore_ascii_case(crate::ADMIN_NAME)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A cart line item.
///
/// Uses the snapshot pattern: name, price, and image are frozen copies of
/// the product at the moment it was added, so a later catalog edit does not
/// change what the customer sees (or pays) for lines already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Product id this line refers to.
    pub id: i64,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen).
    pub price: f64,

    /// Image URL at time of adding (frozen).
    pub image: String,

    /// Quantity in cart. Always positive: a line whose quantity would
    /// reach zero is removed instead.
    pub quantity: i64,
}

impl CartItem {
    /// Freezes a product into a new cart line with quantity 1.
    pub fn snapshot(product: &Product) -> Self {
        CartItem {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        }
    }

    /// Line total (unit price × quantity).
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Delivery address captured at checkout.
///
/// `address_line2` and `landmark` may be empty; the remaining fields are
/// required by the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Address {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub landmark: String,
}

/// Fulfillment status of an order.
///
/// Statuses only ever advance through the admin console; the data layer
/// stores whatever the admin selects and does not enforce the progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OrderStatus {
    #[serde(rename = "ordered")]
    Ordered,
    #[serde(rename = "packing")]
    Packing,
    #[serde(rename = "out for delivery")]
    OutForDelivery,
    #[serde(rename = "delivered")]
    Delivered,
}

impl OrderStatus {
    /// The tracking-timeline order of statuses.
    pub const SEQUENCE: [OrderStatus; 4] = [
        OrderStatus::Ordered,
        OrderStatus::Packing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Ordered
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Ordered => write!(f, "ordered"),
            OrderStatus::Packing => write!(f, "packing"),
            OrderStatus::OutForDelivery => write!(f, "out for delivery"),
            OrderStatus::Delivered => write!(f, "delivered"),
        }
    }
}

/// How an order is (to be) paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    /// Cash on delivery. Convertible to [`PaymentMethod::Online`] later.
    Cod,
    /// Paid online via UPI.
    Online,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "cod"),
            PaymentMethod::Online => write!(f, "online"),
        }
    }
}

/// A placed order.
///
/// Orders are append-only: once placed, only `status` and `payment_method`
/// are ever updated, in place, by the admin paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    /// `"ORD"` followed by the placement timestamp in milliseconds.
    pub id: String,

    /// Email of the ordering account, or `"guest"` for anonymous checkout.
    pub user_id: String,

    /// Frozen cart lines at placement time.
    pub items: Vec<CartItem>,

    /// Delivery address captured at checkout.
    pub address: Address,

    /// Selected payment method.
    pub payment_method: PaymentMethod,

    /// Order total at placement time.
    pub amount: f64,

    /// Fulfillment status, updated in place by the admin console.
    pub status: OrderStatus,

    /// Placement timestamp.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

impl Order {
    /// Builds the order id for a placement instant: `"ORD"` + epoch millis.
    pub fn generate_id(at: DateTime<Utc>) -> String {
        format!("ORD{}", at.timestamp_millis())
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// A single product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Review {
    /// Reviewer's display name (free text, not tied to an account).
    pub name: String,

    /// Star rating, 1 through 5.
    pub rating: u8,

    /// Review body.
    pub comment: String,

    /// Submission timestamp.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

/// Reviews keyed by product id, newest appended last.
pub type ReviewMap = BTreeMap<i64, Vec<Review>>;

/// Saved checkout addresses keyed by account email.
pub type AddressBook = BTreeMap<String, Address>;

// =============================================================================
// Id Assignment
// =============================================================================

/// Next numeric id for a catalog collection: `max(existing) + 1`, or `1`
/// for an empty collection. Ids are never reused, so deleting entry 2 from
/// `[1, 2, 3]` still yields `4` next.
pub fn next_numeric_id<I>(ids: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    ids.into_iter().max().map_or(1, |max| max + 1)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_numeric_id_with_gaps() {
        // Ids are max+1, not first-free: gaps stay gaps.
        assert_eq!(next_numeric_id([1, 3, 4]), 5);
    }

    #[test]
    fn test_next_numeric_id_empty() {
        assert_eq!(next_numeric_id(std::iter::empty()), 1);
    }

    #[test]
    fn test_order_id_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let id = Order::generate_id(at);
        assert!(id.starts_with("ORD"));
        assert_eq!(id, format!("ORD{}", at.timestamp_millis()));
    }

    #[test]
    fn test_order_status_wire_format() {
        // "out for delivery" keeps its spaces on the wire.
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out for delivery\"");

        let parsed: OrderStatus = serde_json::from_str("\"packing\"").unwrap();
        assert_eq!(parsed, OrderStatus::Packing);
    }

    #[test]
    fn test_payment_method_wire_format() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"cod\"");
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Online).unwrap(),
            "\"online\""
        );
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = Order {
            id: "ORD1700000000000".to_string(),
            user_id: "shopper@example.com".to_string(),
            items: vec![],
            address: Address::default(),
            payment_method: PaymentMethod::Cod,
            amount: 2499.0,
            status: OrderStatus::Ordered,
            date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("paymentMethod").is_some());
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn test_address_wire_keys() {
        let address = Address {
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: String::new(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            landmark: String::new(),
        };

        let value = serde_json::to_value(&address).unwrap();
        assert!(value.get("fullName").is_some());
        assert!(value.get("addressLine1").is_some());
    }

    #[test]
    fn test_session_user_admin_check() {
        let admin = SessionUser {
            name: "Sridharani".to_string(),
            email: crate::ADMIN_EMAIL.to_string(),
        };
        assert!(admin.is_admin());

        let shopper = SessionUser {
            name: "asha".to_string(),
            email: "asha@example.com".to_string(),
        };
        assert!(!shopper.is_admin());
    }

    #[test]
    fn test_cart_item_snapshot_freezes_product() {
        let product = Product {
            id: 7,
            name: "Vintage Poster Collection".to_string(),
            price: 2499.0,
            category: "Posters".to_string(),
            image: "https://example.com/poster.jpg".to_string(),
            description: None,
        };

        let item = CartItem::snapshot(&product);
        assert_eq!(item.id, 7);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.price, 2499.0);
        assert_eq!(item.line_total(), 2499.0);
    }
}
