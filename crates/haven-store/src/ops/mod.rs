//! # Domain Operations
//!
//! Typed operations over the [`crate::Store`], one module per area of the
//! storefront:
//!
//! - [`catalog`] - categories, products, and the offer banner (admin)
//! - [`cart`] - shopper cart lines
//! - [`orders`] - checkout, status updates, payment conversion
//! - [`account`] - registration, login, saved addresses
//! - [`reviews`] - product reviews
//!
//! Every operation follows the same shape: validate the input, apply the
//! mutation through [`crate::Store::mutate`], and let the store's save
//! pipeline persist and broadcast the result. Nothing here touches a
//! backing store directly.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod reviews;
