//! Authenticated customer identity sent along with a checkout request.

use serde::{Deserialize, Serialize};

use super::{CustomerId, Email};

/// The signed-in customer, as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Identity provider user ID.
    #[serde(rename = "clerkId")]
    pub id: CustomerId,
    /// Primary email address.
    pub email: Email,
    /// Display name, if the customer set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
