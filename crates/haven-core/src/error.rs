//! # Error Types
//!
//! Domain-specific error types for haven-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  haven-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Entry-level validation failures                │
//! │                                                                         │
//! │  haven-store errors (separate crate)                                   │
//! │  └── StoreError       - Persistence and remote-sync failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → UI collaborator      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, field names)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
///
/// These errors represent operations that the catalog, cart, order, or
/// account rules refuse. They should be caught and translated to
/// user-facing messages by the UI collaborator.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Category id does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The cart has no line for the given product id.
    #[error("Product {0} is not in the cart")]
    NotInCart(i64),

    /// An order cannot be placed from an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Registration attempted with a name or email that is already taken.
    #[error("{field} '{value}' already registered")]
    DuplicateUser { field: String, value: String },

    /// Registration attempted under the reserved admin name.
    #[error("Name '{0}' is reserved")]
    ReservedName(String),

    /// Login failed: no user matches the name/email + password pair.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Payment conversion requested for an order that is not cash-on-delivery.
    #[error("Order {order_id} is already paid via {method}")]
    AlreadyPaidOnline { order_id: String, method: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Entry-level validation failures.
///
/// Produced by the screening passes in [`crate::validation`] and by the
/// pre-save checks in the store layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., not a finite number, wrong JSON shape).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A persisted collection is not the expected JSON array/object shape.
    #[error("{collection} is not a valid collection: {reason}")]
    MalformedCollection { collection: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
