//! # In-Memory Mirror
//!
//! The collections the store owns, plus the persisted key names.
//!
//! ## Collection Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Persisted Collections                               │
//! │                                                                         │
//! │  SHARED (remote-backed when remote mode is on, mirrored locally)       │
//! │  ├── categories    Category[]                                          │
//! │  ├── products     Product[]                                           │
//! │  ├── orders       Order[]                                             │
//! │  └── offerBanner  OfferBanner | null                                  │
//! │                                                                         │
//! │  USER-LOCAL (always local storage, never sent to the remote)           │
//! │  ├── users         User[]                                              │
//! │  ├── reviews       { productId: Review[] }                             │
//! │  ├── currentUser   SessionUser | null                                  │
//! │  ├── cart          CartItem[]                                          │
//! │  └── userAddresses { email: Address }                                  │
//! │                                                                         │
//! │  MARKER                                                                │
//! │  └── lastUpdate    epoch millis as a string                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use haven_core::{AddressBook, Cart, Category, OfferBanner, Order, Product, ReviewMap, SessionUser, User};
use serde::{Deserialize, Serialize};

/// Persisted key names.
///
/// These are wire-compatible with the storefront's existing storage: one
/// string key per collection, no namespacing, no versioning.
pub mod keys {
    pub const USERS: &str = "users";
    pub const CATEGORIES: &str = "categories";
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
    pub const OFFER_BANNER: &str = "offerBanner";
    pub const REVIEWS: &str = "reviews";
    pub const CURRENT_USER: &str = "currentUser";
    pub const CART: &str = "cart";
    pub const ADDRESSES: &str = "userAddresses";
    pub const LAST_UPDATE: &str = "lastUpdate";
}

/// The shared collections, in the order they are fetched and written.
pub const SHARED_KEYS: [&str; 4] = [
    keys::CATEGORIES,
    keys::PRODUCTS,
    keys::ORDERS,
    keys::OFFER_BANNER,
];

// =============================================================================
// Store Data
// =============================================================================

/// The authoritative in-memory copy of every collection.
///
/// Owned exclusively by the [`crate::Store`]; external code reads through
/// snapshots and mutates through `mutate`, never by reaching in directly.
#[derive(Debug, Clone, Default)]
pub struct StoreData {
    // Shared collections
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub offer_banner: Option<OfferBanner>,

    // User-local collections
    pub users: Vec<User>,
    pub reviews: ReviewMap,
    pub current_user: Option<SessionUser>,
    pub cart: Cart,
    pub addresses: AddressBook,
}

impl StoreData {
    /// A point-in-time copy of the four shared collections, as carried by
    /// the data-changed event.
    pub fn shared_snapshot(&self) -> SharedSnapshot {
        SharedSnapshot {
            categories: self.categories.clone(),
            products: self.products.clone(),
            orders: self.orders.clone(),
            offer_banner: self.offer_banner.clone(),
        }
    }
}

/// Snapshot of the shared collections at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSnapshot {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub offer_banner: Option<OfferBanner>,
}
