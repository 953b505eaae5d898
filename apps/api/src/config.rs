//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `main` loads `.env` first (via `dotenvy`) so local development
//! needs no exported variables.

use std::env;
use std::path::PathBuf;

use smartsales_gateway::stripe::DEFAULT_API_BASE;
use smartsales_gateway::StripeConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Stripe secret key (`sk_...`)
    pub stripe_secret_key: String,

    /// Webhook signing secret (`whsec_...`)
    pub stripe_webhook_secret: String,

    /// Stripe REST base URL
    pub stripe_api_base: String,

    /// Where the hosted checkout page returns after payment
    pub payment_success_url: String,

    /// Where the hosted checkout page returns on cancel
    pub payment_cancel_url: String,

    /// ISO currency for all sessions
    pub payment_currency: String,

    /// Speech-to-text endpoint. Voice reports answer 503 when unset.
    pub transcription_url: Option<String>,

    /// Language hint for transcription
    pub transcription_language: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup (tests use a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
        };

        let config = ApiConfig {
            http_port: var("HTTP_PORT", "8000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: PathBuf::from(var("DATABASE_PATH", "./smartsales.db")),

            db_max_connections: var("DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            stripe_secret_key: required("STRIPE_SECRET_KEY")?,

            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,

            stripe_api_base: var("STRIPE_API_BASE", DEFAULT_API_BASE),

            payment_success_url: var("PAYMENT_SUCCESS_URL", "http://localhost:3000/payment/success"),

            payment_cancel_url: var("PAYMENT_CANCEL_URL", "http://localhost:3000/payment/cancel"),

            payment_currency: var("PAYMENT_CURRENCY", smartsales_core::DEFAULT_CURRENCY),

            transcription_url: lookup("TRANSCRIPTION_URL").filter(|v| !v.trim().is_empty()),

            transcription_language: var("TRANSCRIPTION_LANGUAGE", "es-ES"),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Gateway adapter settings.
    pub fn stripe(&self) -> StripeConfig {
        StripeConfig {
            secret_key: self.stripe_secret_key.clone(),
            webhook_secret: self.stripe_webhook_secret.clone(),
            api_base: self.stripe_api_base.clone(),
            success_url: self.payment_success_url.clone(),
            cancel_url: self.payment_cancel_url.clone(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const SECRETS: [(&str, &str); 2] = [("STRIPE_SECRET_KEY", "sk_test"), ("STRIPE_WEBHOOK_SECRET", "whsec_test")];

    #[test]
    fn test_defaults() {
        let config = load(&SECRETS).unwrap();
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.database_path, PathBuf::from("./smartsales.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.stripe_api_base, "https://api.stripe.com");
        assert_eq!(config.payment_currency, "usd");
        assert_eq!(config.transcription_url, None);
        assert_eq!(config.transcription_language, "es-ES");
    }

    #[test]
    fn test_missing_stripe_secret() {
        let err = load(&[("STRIPE_WEBHOOK_SECRET", "whsec_test")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(ref k) if k == "STRIPE_SECRET_KEY"));

        let err = load(&[("STRIPE_SECRET_KEY", "  "), ("STRIPE_WEBHOOK_SECRET", "whsec_test")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }

    #[test]
    fn test_invalid_numbers() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("HTTP_PORT", "eighty"));
        assert!(matches!(load(&pairs), Err(ConfigError::InvalidValue(ref k)) if k == "HTTP_PORT"));

        let mut pairs = SECRETS.to_vec();
        pairs.push(("DB_MAX_CONNECTIONS", "0"));
        assert!(matches!(load(&pairs), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_stripe_config_mapping() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("PAYMENT_SUCCESS_URL", "https://shop.example.com/ok"));
        pairs.push(("TRANSCRIPTION_URL", "http://stt.local/v1/recognize"));
        let config = load(&pairs).unwrap();

        let stripe = config.stripe();
        assert_eq!(stripe.secret_key, "sk_test");
        assert_eq!(stripe.success_url, "https://shop.example.com/ok");
        assert_eq!(config.transcription_url.as_deref(), Some("http://stt.local/v1/recognize"));
    }
}
