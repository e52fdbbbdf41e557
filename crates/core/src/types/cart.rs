//! Cart line items and their variant identity.
//!
//! A line is identified by its variant key: product ID plus the selected color
//! and size. Absent attributes are part of the key, so a line with no size is
//! a different line from one whose size is the empty string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Price, ProductError, ProductId, ProductSnapshot};

/// Why a candidate line item can't enter the cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartItemError {
    /// The product snapshot is malformed.
    #[error("invalid product: {0}")]
    InvalidProduct(#[from] ProductError),
    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// The matching line already holds the largest quantity a line can have.
    #[error("quantity is already at the maximum of {}", u32::MAX)]
    QuantityLimit,
}

/// One cart entry: a product variant and how many of it.
///
/// The persisted field for the product was historically called `item`; both
/// names are accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(alias = "item")]
    pub product: ProductSnapshot,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartItem {
    /// Create a line for `quantity` units of a product with no variant selected.
    #[must_use]
    pub const fn new(product: ProductSnapshot, quantity: u32) -> Self {
        Self {
            product,
            quantity,
            color: None,
            size: None,
        }
    }

    /// Set the selected color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the selected size.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Check that the line could be stored in a cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartItemError`] for a malformed product or a zero quantity.
    pub fn validate(&self) -> Result<(), CartItemError> {
        self.product.validate()?;
        if self.quantity == 0 {
            return Err(CartItemError::ZeroQuantity);
        }
        Ok(())
    }

    /// Owned variant key of this line.
    #[must_use]
    pub fn key(&self) -> VariantKey {
        VariantKey {
            product_id: self.product.id.clone(),
            color: self.color.clone(),
            size: self.size.clone(),
        }
    }

    /// Returns `true` if this line has exactly the given variant identity.
    #[must_use]
    pub fn matches(&self, key: &VariantKey) -> bool {
        self.product.id == key.product_id && self.color == key.color && self.size == key.size
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// The (product, color, size) triple that uniquely identifies a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub product_id: ProductId,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl VariantKey {
    /// Key for a product with no color or size selected.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: product_id.into(),
            color: None,
            size: None,
        }
    }

    /// Key with optional attributes, as handed over by UI controls.
    #[must_use]
    pub fn from_parts(
        product_id: impl Into<ProductId>,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            color: color.map(str::to_owned),
            size: size.map(str::to_owned),
        }
    }

    /// Set the color component.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the size component.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }
}

impl core::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} (color: {}, size: {})",
            self.product_id,
            self.color.as_deref().unwrap_or("-"),
            self.size.as_deref().unwrap_or("-")
        )
    }
}

/// Totals shown next to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartSummary {
    /// Sum of line totals, rounded to cents.
    pub subtotal: Price,
    /// Sum of quantities.
    pub item_count: u64,
    /// Number of distinct lines.
    pub line_count: usize,
}

impl CartSummary {
    /// Compute totals for a list of lines.
    #[must_use]
    pub fn from_items(items: &[CartItem]) -> Self {
        Self {
            subtotal: items.iter().map(CartItem::line_total).sum::<Price>().round_cents(),
            item_count: items.iter().map(|item| u64::from(item.quantity)).sum(),
            line_count: items.len(),
        }
    }
}
