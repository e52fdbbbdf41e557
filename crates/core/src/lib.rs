//! Fashion Store Core - Shared types library.
//!
//! This crate provides the types shared by all Fashion Store components:
//! - `cart` - Client-side cart store, persistence and checkout handoff
//! - `cli` - Command-line driver for a file-backed cart
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage
//! backends, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere a product snapshot or cart line needs to be described.
//!
//! # Modules
//!
//! - [`types`] - Product snapshots, cart line items, prices, emails and IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
