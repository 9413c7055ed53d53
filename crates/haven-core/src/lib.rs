//! # haven-core: Pure Domain Logic for DesignHaven
//!
//! This crate is the **heart** of the DesignHaven data layer. It contains
//! the domain types and rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DesignHaven Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront / Admin UI (external)                │   │
//! │  │    Catalog pages ──► Cart ──► Checkout ──► Order tracking      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ store API                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    haven-store (data layer)                     │   │
//! │  │    Store mirror, remote/local backends, refresh task, ops      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ haven-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │ validation│  │    upi    │  │   │
//! │  │   │  Product  │  │   Cart    │  │   rules   │  │ deep links│  │   │
//! │  │   │   Order   │  │ CartItem  │  │  reports  │  │ QR  URLs  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, Product, Order, etc.)
//! - [`cart`] - Cart arithmetic with snapshot line items
//! - [`validation`] - Collection screening with typed reports
//! - [`error`] - Domain error types
//! - [`upi`] - UPI payment-link construction
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Storage, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Screening over dropping**: Validation reports say which entries were
//!    rejected and why, instead of silently shrinking a collection

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod upi;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use haven_core::Product` instead of
// `use haven_core::types::Product`

pub use cart::Cart;
pub use error::{CoreError, ValidationError};
pub use types::*;
pub use validation::ValidationReport;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// The reserved administrator account name.
///
/// Registration under this name (case-insensitive) is refused, and a login
/// with this name plus [`ADMIN_PASSWORD`] opens the admin session without a
/// matching entry in the users collection.
pub const ADMIN_NAME: &str = "sridharani";

/// The administrator password, compared verbatim at login.
///
/// Credentials live in the data layer because the original storefront works
/// without any server-side auth. Plaintext storage and comparison is a
/// documented property of this system, not an oversight of this crate.
pub const ADMIN_PASSWORD: &str = "xyz@@21";

/// Email recorded on the admin session user.
pub const ADMIN_EMAIL: &str = "admin@designhaven.com";

/// User id recorded on orders placed without a logged-in session.
pub const GUEST_USER_ID: &str = "guest";

/// Maximum length of a user's name and email.
pub const MAX_USER_FIELD_LEN: usize = 100;

/// Maximum length of a user's password.
pub const MAX_PASSWORD_LEN: usize = 200;

/// Maximum length of a category name (also a product's category reference).
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Maximum length of a product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Maximum length of any image URL field.
pub const MAX_IMAGE_URL_LEN: usize = 500;

/// Maximum length of a product description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Upper bound for product prices and order amounts (inclusive).
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Maximum length of an order id.
pub const MAX_ORDER_ID_LEN: usize = 50;

/// Maximum length of the offer banner text.
pub const MAX_BANNER_LEN: usize = 200;
