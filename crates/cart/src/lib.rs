//! Fashion Store Cart - persisted client-side shopping cart.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart lines and enforces the cart invariants
//! - [`CartStorage`] abstracts durable storage (memory or files)
//! - [`Notifier`] carries user-facing success/failure messages (toasts)
//! - [`CheckoutClient`] hands a cart snapshot to the Checkout Service
//!
//! # Example
//!
//! ```rust
//! use fashion_store_cart::{CartStore, MemoryStorage};
//! use fashion_store_core::{CartItem, Price, ProductSnapshot, VariantKey};
//!
//! let mut cart = CartStore::open(MemoryStorage::new());
//! let shirt = ProductSnapshot::new("p1", "Shirt", Price::from_cents(2000));
//!
//! cart.add_item(CartItem::new(shirt.clone(), 1).with_color("red").with_size("M"));
//! cart.add_item(CartItem::new(shirt, 2).with_color("red").with_size("M"));
//!
//! let key = VariantKey::new("p1").with_color("red").with_size("M");
//! assert_eq!(cart.get(&key).map(|line| line.quantity), Some(3));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod notify;
pub mod persist;
pub mod storage;
pub mod store;

pub use checkout::{CheckoutClient, CheckoutError};
pub use notify::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use persist::STORAGE_KEY;
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{AddOutcome, CartStore, Decrease, ReplaceReport};
