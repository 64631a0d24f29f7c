//! Analytics configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Analytics sink configuration (Segment HTTP API)
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Send events to the sink. When false, events are only logged.
    #[serde(default)]
    pub enabled: bool,

    /// Segment write key
    #[serde(default)]
    pub write_key: Option<SecretString>,

    /// Track endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl AnalyticsConfig {
    /// Validate analytics configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled
            && !self
                .write_key
                .as_ref()
                .is_some_and(|key| !key.expose_secret().is_empty())
        {
            return Err(ValidationError::MissingRequired("ANALYTICS__WRITE_KEY"));
        }
        if self.timeout_ms == 0 || self.timeout_ms > 60_000 {
            return Err(ValidationError::InvalidOutboundTimeout("analytics"));
        }
        Ok(())
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            write_key: None,
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.segment.io/v1/track".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_by_default() {
        let config = AnalyticsConfig::default();
        assert!(!config.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enabled_requires_write_key() {
        let config = AnalyticsConfig {
            enabled: true,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("ANALYTICS__WRITE_KEY"))
        );
    }
}
