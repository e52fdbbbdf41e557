//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FASHION_STORE_CART_DIR` - Directory holding the persisted cart (default: `.fashion-store`)
//! - `FASHION_STORE_API_URL` - Backend API base URL (required by `checkout`)
//! - `FASHION_STORE_CHECKOUT_TIMEOUT_SECS` - Checkout request timeout (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_CART_DIR: &str = ".fashion-store";
const DEFAULT_CHECKOUT_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory for `FileStorage`
    pub cart_dir: PathBuf,
    /// Backend API base URL, if configured
    pub api_url: Option<Url>,
    /// Timeout for checkout requests
    pub checkout_timeout: Duration,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cart_dir = PathBuf::from(
            lookup("FASHION_STORE_CART_DIR").unwrap_or_else(|| DEFAULT_CART_DIR.to_string()),
        );

        let api_url = lookup("FASHION_STORE_API_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("FASHION_STORE_API_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let timeout_secs = lookup("FASHION_STORE_CHECKOUT_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_CHECKOUT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "FASHION_STORE_CHECKOUT_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            cart_dir,
            api_url,
            checkout_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// The API base URL, for commands that talk to the backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `FASHION_STORE_API_URL` is unset.
    pub fn require_api_url(&self) -> Result<&Url, ConfigError> {
        self.api_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FASHION_STORE_API_URL".to_string()))
    }
}
