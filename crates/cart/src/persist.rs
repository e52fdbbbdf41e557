//! Persisted cart document.
//!
//! The document is the envelope the web client's persistence layer already
//! writes, so carts saved by either side load in the other:
//!
//! ```json
//! { "state": { "cartItems": [ ... ] }, "version": 0 }
//! ```
//!
//! Decoding stops at the envelope and hands back the raw `cartItems` value.
//! Item-level validation belongs to the store, which drops bad entries one by
//! one instead of rejecting the whole document.

use fashion_store_core::CartItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage key the cart is persisted under.
pub const STORAGE_KEY: &str = "cart-storage";

/// Envelope version written by this crate.
pub const STORAGE_VERSION: u32 = 0;

#[derive(Serialize)]
struct Envelope<'a> {
    state: State<'a>,
    version: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct State<'a> {
    cart_items: &'a [CartItem],
}

#[derive(Deserialize)]
struct RawEnvelope {
    state: RawState,
    #[serde(default)]
    version: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawState {
    #[serde(default)]
    cart_items: Value,
}

/// Raw contents of a persisted document.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The `cartItems` value, not yet validated. May not even be an array.
    pub items: Value,
    /// Envelope version found in the document.
    pub version: u32,
}

/// Serialize the full item list into a storage document.
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn encode(items: &[CartItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope {
        state: State { cart_items: items },
        version: STORAGE_VERSION,
    })
}

/// Parse a storage document down to its unvalidated item list.
///
/// # Errors
///
/// Returns `serde_json::Error` if the document isn't JSON or has no `state`.
pub fn decode(raw: &str) -> Result<Decoded, serde_json::Error> {
    let envelope: RawEnvelope = serde_json::from_str(raw)?;
    Ok(Decoded {
        items: envelope.state.cart_items,
        version: envelope.version,
    })
}
