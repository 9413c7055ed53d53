//! # Cart
//!
//! Pure cart arithmetic over snapshot line items.
//!
//! ## Invariants
//! - Lines are unique by product id (adding the same product increments
//!   the existing line's quantity)
//! - Quantity is always positive: a delta that takes a line to zero or
//!   below removes the line entirely
//! - Totals are derived, never stored

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{CartItem, Product};

/// The shopping cart.
///
/// Serializes as a bare array of line items, matching the persisted
/// `cart` key exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Wraps already-persisted line items.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Cart { items }
    }

    /// Read-only view of the line items.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Adds one unit of a product.
    ///
    /// If the product is already in the cart its quantity goes up by one;
    /// otherwise a new snapshot line with quantity 1 is appended.
    pub fn add_product(&mut self, product: &Product) {
        if let Some(line) = self.items.iter_mut().find(|line| line.id == product.id) {
            line.quantity += 1;
        } else {
            self.items.push(CartItem::snapshot(product));
        }
    }

    /// Applies a signed quantity delta to a line.
    ///
    /// ## Behavior
    /// - Resulting quantity `<= 0` removes the line entirely; a line never
    ///   survives with quantity zero or negative
    /// - Unknown product id returns [`CoreError::NotInCart`]
    pub fn change_quantity(&mut self, product_id: i64, delta: i64) -> CoreResult<()> {
        let line = self
            .items
            .iter_mut()
            .find(|line| line.id == product_id)
            .ok_or(CoreError::NotInCart(product_id))?;

        line.quantity += delta;
        if line.quantity <= 0 {
            self.remove(product_id);
        }
        Ok(())
    }

    /// Removes a line by product id. Removing an absent id is a no-op.
    pub fn remove(&mut self, product_id: i64) {
        self.items.retain(|line| line.id != product_id);
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total unit count across all lines (the cart badge number).
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Sum of line totals. The storefront has no separate tax or shipping,
    /// so this is also the order amount at checkout.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Takes the line items out, leaving the cart empty.
    pub fn take_items(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
