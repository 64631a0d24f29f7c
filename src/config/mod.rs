//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SUBSCRIPTION_RELAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use subscription_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod analytics;
mod commerce;
mod email;
mod error;
mod health;
mod server;
mod webhook;

pub use analytics::AnalyticsConfig;
pub use commerce::CommerceConfig;
pub use email::{EmailConfig, EmailTemplateIds};
pub use error::{ConfigError, ValidationError};
pub use health::HealthConfig;
pub use server::{Environment, ServerConfig};
pub use webhook::WebhookConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, public URL)
    #[serde(default)]
    pub server: ServerConfig,

    /// Inbound webhook verification and deduplication
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Commerce platform GraphQL API
    pub commerce: CommerceConfig,

    /// Email configuration (SendGrid)
    pub email: EmailConfig,

    /// Analytics sink (Segment)
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Health signal baseline and thresholds
    #[serde(default)]
    pub health: HealthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SUBSCRIPTION_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SUBSCRIPTION_RELAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SUBSCRIPTION_RELAY__EMAIL__TEMPLATES__ORDER_CONFIRMATION=d-1` -> `email.templates.order_confirmation`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUBSCRIPTION_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.webhook.validate(self.is_production())?;
        if self.webhook.claim_lease_secs <= self.server.request_timeout_secs {
            return Err(ValidationError::ClaimLeaseShorterThanRequest);
        }
        self.commerce.validate()?;
        self.email.validate()?;
        self.analytics.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Help center link for email templates
    pub fn help_center_url(&self) -> String {
        self.email
            .help_center_url
            .clone()
            .unwrap_or_else(|| format!("{}/help", self.server.public_base_url()))
    }
}
