//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog sends prices as bare JSON numbers in the store currency, so
//! `Price` serializes as a number and only accepts numbers on the way in. A
//! string such as `"20"` is a malformed snapshot, not a price.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A unit or line price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Price of `quantity` units, saturating instead of overflowing.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// Returns `true` if the price reads back unchanged after being written
    /// as a JSON number.
    ///
    /// Numbers travel as `f64`, so amounts with more significant digits than
    /// a float holds come back rounded.
    #[must_use]
    pub fn survives_json(&self) -> bool {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| Self::deserialize(value).ok())
            .is_some_and(|parsed| parsed == *self)
    }

    /// Round to cents using banker's rounding.
    #[must_use]
    pub fn round_cents(&self) -> Self {
        Self(self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| {
            Self(acc.0.checked_add(p.0).unwrap_or(Decimal::MAX))
        })
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `Number` rejects strings, bools and nulls.
        let number = serde_json::Number::deserialize(deserializer)?;
        decimal_from_number(&number)
            .map(Self)
            .ok_or_else(|| serde::de::Error::custom(format!("price out of range: {number}")))
    }
}

fn decimal_from_number(number: &serde_json::Number) -> Option<Decimal> {
    if let Some(n) = number.as_i64() {
        return Some(Decimal::from(n));
    }
    if let Some(n) = number.as_u64() {
        return Some(Decimal::from(n));
    }
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
