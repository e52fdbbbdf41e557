//! Core types for Fashion Store.
//!
//! This module provides type-safe wrappers for the catalog and cart concepts
//! the storefront passes around.

pub mod cart;
pub mod customer;
pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{CartItem, CartItemError, CartSummary, VariantKey};
pub use customer::Customer;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use product::{ProductError, ProductSnapshot};
