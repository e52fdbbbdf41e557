//! Product snapshots held by cart lines.
//!
//! The catalog service owns products; a cart line keeps a copy of the fields
//! it needs to render and price itself. The snapshot is never mutated after
//! it enters the cart.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::{Price, ProductId};

/// Structural problems with a product snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    /// The product ID is empty or whitespace.
    #[error("product id cannot be empty")]
    EmptyId,
    /// The unit price is below zero.
    #[error("product {id} has a negative price ({price})")]
    NegativePrice {
        /// Offending product.
        id: ProductId,
        /// Offending price.
        price: Price,
    },
    /// The unit price has more precision than a stored JSON number keeps.
    #[error("product {id} has a price that can't be stored exactly ({price})")]
    ImprecisePrice {
        /// Offending product.
        id: ProductId,
        /// Offending price.
        price: Price,
    },
}

/// Copy of a catalog product taken when it was added to the cart.
///
/// Only `id`, `title` and `price` are required; the lists default to empty so
/// partial shapes from older clients still load. The backend's `_id` field
/// name is accepted as an alias for `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub colors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sizes: Vec<String>,
}

impl ProductSnapshot {
    /// Create a snapshot with no media, colors or sizes.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            media: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
        }
    }

    /// Check the structural rules every snapshot in a cart must satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError`] if the ID is blank, or the price is negative or
    /// would not survive being persisted.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.id.is_blank() {
            return Err(ProductError::EmptyId);
        }
        if self.price.is_negative() {
            return Err(ProductError::NegativePrice {
                id: self.id.clone(),
                price: self.price,
            });
        }
        if !self.price.survives_json() {
            return Err(ProductError::ImprecisePrice {
                id: self.id.clone(),
                price: self.price,
            });
        }
        Ok(())
    }

    /// First media URL, used as the line thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.media.first().map(String::as_str)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_partial_shape_deserializes() {
        let product: ProductSnapshot =
            serde_json::from_value(json!({ "id": "p1", "title": "Shirt", "price": 20 })).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert!(product.media.is_empty());
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_backend_shape_deserializes() {
        let product: ProductSnapshot = serde_json::from_value(json!({
            "_id": "64f1",
            "title": "Linen Dress",
            "description": "ignored",
            "price": 89.5,
            "media": ["https://cdn.example.com/dress.jpg"],
            "colors": ["sand"],
            "sizes": null,
            "category": "dresses"
        }))
        .unwrap();
        assert_eq!(product.id.as_str(), "64f1");
        assert_eq!(product.price, Price::from_cents(8950));
        assert_eq!(product.thumbnail(), Some("https://cdn.example.com/dress.jpg"));
        assert!(product.sizes.is_empty());
    }

    #[test]
    fn test_missing_required_fields_fail() {
        assert!(serde_json::from_value::<ProductSnapshot>(json!({ "title": "x", "price": 1 })).is_err());
        assert!(serde_json::from_value::<ProductSnapshot>(json!({ "id": "p", "price": 1 })).is_err());
        assert!(
            serde_json::from_value::<ProductSnapshot>(json!({ "id": "p", "title": "x", "price": "1" }))
                .is_err()
        );
    }

    #[test]
    fn test_validate() {
        let blank = ProductSnapshot::new("  ", "Shirt", Price::from_cents(100));
        assert_eq!(blank.validate(), Err(ProductError::EmptyId));

        let negative = ProductSnapshot::new("p1", "Shirt", Price::from_cents(-100));
        assert!(matches!(
            negative.validate(),
            Err(ProductError::NegativePrice { .. })
        ));

        let free = ProductSnapshot::new("p1", "Sticker", Price::ZERO);
        assert!(free.validate().is_ok());

        let precise = ProductSnapshot::new(
            "p1",
            "Shirt",
            Price::new("19.123456789012345678".parse().unwrap()),
        );
        assert!(matches!(
            precise.validate(),
            Err(ProductError::ImprecisePrice { .. })
        ));
    }
}
