//! Checkout handoff command.

use fashion_store_cart::{CartStorage, CartStore, CheckoutClient, Notifier};
use fashion_store_core::{Customer, CustomerId, Email};
use tracing::info;

use crate::config::CliConfig;

/// Customer identity given on the command line.
pub struct CustomerArgs {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

impl CustomerArgs {
    fn into_customer(self) -> Result<Customer, Box<dyn std::error::Error>> {
        Ok(Customer {
            id: CustomerId::new(self.id),
            email: Email::parse(&self.email)?,
            name: self.name.filter(|name| !name.trim().is_empty()),
        })
    }
}

/// Create a checkout session for the cart and log the redirect URL.
///
/// The cart is only cleared when `clear` is set and the session was created.
///
/// # Errors
///
/// Returns an error if the API URL is not configured, the customer identity is
/// invalid, or the Checkout Service request fails.
pub async fn run<S: CartStorage, N: Notifier>(
    config: &CliConfig,
    cart: &mut CartStore<S, N>,
    customer: CustomerArgs,
    clear: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let customer = customer.into_customer()?;
    let client = CheckoutClient::new(config.require_api_url()?, config.checkout_timeout)?;

    info!(endpoint = %client.endpoint(), lines = cart.len(), "Creating checkout session");
    let redirect = client.create_session(cart.items(), &customer).await?;
    info!("Continue to payment: {redirect}");

    if clear {
        cart.clear();
    }
    Ok(())
}
