//! Runtime configuration for the outbound adapters.
//!
//! Everything is built explicitly and handed to constructors; nothing is read
//! from the environment after startup.

use crate::error::{PrintQError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.paymongo.com/v1";
pub const DEFAULT_CURRENCY: &str = "PHP";
pub const DEFAULT_PAYMENT_METHODS: &[&str] = &["gcash", "paymaya", "card"];

/// Settings for the payment gateway's checkout-session API.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub secret_key: String,
    pub api_base: String,
    pub currency: String,
    pub payment_method_types: Vec<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

impl GatewayConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            payment_method_types: DEFAULT_PAYMENT_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            success_url: None,
            cancel_url: None,
        }
    }

    /// Loads from `PAYMONGO_SECRET_KEY` (required), `PAYMONGO_API_BASE`,
    /// `PAYMONGO_PAYMENT_METHODS` (comma separated), `CHECKOUT_SUCCESS_URL`
    /// and `CHECKOUT_CANCEL_URL`.
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("PAYMONGO_SECRET_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PrintQError::Config("PAYMONGO_SECRET_KEY must be set".to_string()))?;

        let mut config = Self::new(secret_key);
        if let Some(base) = non_empty_var("PAYMONGO_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(methods) = non_empty_var("PAYMONGO_PAYMENT_METHODS") {
            config.payment_method_types = methods
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
        }
        config.success_url = non_empty_var("CHECKOUT_SUCCESS_URL");
        config.cancel_url = non_empty_var("CHECKOUT_CANCEL_URL");
        Ok(config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}
