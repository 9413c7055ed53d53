//! # Order Operations
//!
//! Checkout, fulfillment status updates, and COD-to-online payment
//! conversion.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Lifecycle                                  │
//! │                                                                         │
//! │  place_order (cart + address + payment method)                         │
//! │       │   id = "ORD"+millis, status = ordered, cart cleared            │
//! │       ▼                                                                 │
//! │  ordered ──► packing ──► out for delivery ──► delivered                │
//! │             (admin console drives the status, in place)                │
//! │                                                                         │
//! │  cod ──► online   via convert_to_online_payment (in place, one-way)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders are append-only apart from these two in-place field updates.

use chrono::Utc;
use haven_core::{Address, CoreError, Order, OrderStatus, PaymentMethod, GUEST_USER_ID};

use crate::error::StoreResult;
use crate::store::Store;

impl Store {
    /// Places an order from the current cart.
    ///
    /// The order takes a frozen copy of the cart lines and the cart
    /// subtotal; the cart is cleared on success. With `save_address` set
    /// and a logged-in session, the address is stored in the address book
    /// under the account email.
    pub async fn place_order(
        &self,
        address: Address,
        payment_method: PaymentMethod,
        save_address: bool,
    ) -> StoreResult<Order> {
        self.mutate(|data| {
            if data.cart.is_empty() {
                return Err(CoreError::EmptyCart.into());
            }

            let user_id = data
                .current_user
                .as_ref()
                .map(|user| user.email.clone())
                .unwrap_or_else(|| GUEST_USER_ID.to_string());

            if save_address {
                if let Some(user) = &data.current_user {
                    data.addresses.insert(user.email.clone(), address.clone());
                }
            }

            let now = Utc::now();
            let order = Order {
                id: Order::generate_id(now),
                user_id,
                items: data.cart.items().to_vec(),
                address,
                payment_method,
                amount: data.cart.subtotal(),
                status: OrderStatus::Ordered,
                date: now,
            };

            data.orders.push(order.clone());
            data.cart.clear();
            Ok(order)
        })
        .await
    }

    /// Updates an order's fulfillment status in place.
    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> StoreResult<()> {
        self.mutate(|data| {
            let order = data
                .orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
            order.status = status;
            Ok(())
        })
        .await
    }

    /// Converts a cash-on-delivery order to online payment, in place.
    /// Refused for orders that are not COD.
    pub async fn convert_to_online_payment(&self, order_id: &str) -> StoreResult<()> {
        self.mutate(|data| {
            let order = data
                .orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

            if order.payment_method != PaymentMethod::Cod {
                return Err(CoreError::AlreadyPaidOnline {
                    order_id: order.id.clone(),
                    method: order.payment_method.to_string(),
                }
                .into());
            }

            order.payment_method = PaymentMethod::Online;
            Ok(())
        })
        .await
    }

    /// A user's orders, newest first.
    pub fn orders_for_user(&self, email: &str) -> Vec<Order> {
        self.with_data(|data| {
            let mut orders: Vec<Order> = data
                .orders
                .iter()
                .filter(|o| o.user_id == email)
                .cloned()
                .collect();
            orders.reverse();
            orders
        })
    }

    /// Looks up one order by id (the tracking page).
    pub fn find_order(&self, order_id: &str) -> Option<Order> {
        self.with_data(|data| data.orders.iter().find(|o| o.id == order_id).cloned())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
