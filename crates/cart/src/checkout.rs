//! Checkout Service client.
//!
//! Hands a cart snapshot and the signed-in customer to the backend's checkout
//! endpoint, which answers with the payment provider URL to redirect to. The
//! cart is not cleared here: callers clear it once payment is confirmed.

use std::time::Duration;

use fashion_store_core::{CartItem, Customer};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Path of the checkout endpoint relative to the API base URL.
const CHECKOUT_PATH: &str = "checkout";

/// Errors that can occur when creating a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response had no usable redirect URL.
    #[error("checkout response did not include a redirect URL")]
    MissingRedirectUrl,

    /// The API base URL or the returned redirect URL is invalid.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    cart_items: &'a [CartItem],
    customer: &'a Customer,
}

#[derive(Deserialize)]
struct CheckoutResponse {
    #[serde(default)]
    url: Option<String>,
}

/// Client for the Checkout Service.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl CheckoutClient {
    /// Create a client for the API at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint URL can't be built or the HTTP client
    /// fails to build.
    pub fn new(api_url: &Url, timeout: Duration) -> Result<Self, CheckoutError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::from_client(client, api_url)
    }

    /// Create a client reusing a preconfigured HTTP client.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint URL can't be built.
    pub fn from_client(client: reqwest::Client, api_url: &Url) -> Result<Self, CheckoutError> {
        Ok(Self {
            client,
            endpoint: checkout_endpoint(api_url)?,
        })
    }

    /// Endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Create a checkout session and return the redirect URL.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` without sending anything when
    /// `items` is empty, and an error if the request fails, the API answers
    /// with a non-success status, or the response has no valid URL.
    #[tracing::instrument(skip_all, fields(customer = %customer.id, lines = items.len()))]
    pub async fn create_session(
        &self,
        items: &[CartItem],
        customer: &Customer,
    ) -> Result<Url, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&CheckoutRequest {
                cart_items: items,
                customer,
            })
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Checkout request rejected");
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CheckoutResponse = response.json().await?;
        let url = parse_redirect(body.url.as_deref())?;
        tracing::info!(redirect = %url, "Checkout session created");
        Ok(url)
    }
}

/// Build `{api_url}/checkout`, keeping any path prefix on the base URL.
fn checkout_endpoint(api_url: &Url) -> Result<Url, url::ParseError> {
    let mut base = api_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(CHECKOUT_PATH)
}

fn parse_redirect(url: Option<&str>) -> Result<Url, CheckoutError> {
    match url.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(Url::parse(url)?),
        _ => Err(CheckoutError::MissingRedirectUrl),
    }
}
