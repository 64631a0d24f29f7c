//! Commerce platform configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Commerce platform GraphQL API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CommerceConfig {
    /// Store host name, e.g. `my-store.myshopify.com`
    pub store_domain: String,

    /// Admin API access token
    pub access_token: SecretString,

    /// API version segment of the GraphQL endpoint
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How far ahead renewal reminders look, in days
    #[serde(default = "default_renewal_window_days")]
    pub renewal_window_days: u32,
}

impl CommerceConfig {
    pub fn graphql_endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }

    /// Validate commerce configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.store_domain.is_empty() {
            return Err(ValidationError::MissingRequired("COMMERCE__STORE_DOMAIN"));
        }
        if self.store_domain.contains("://") || self.store_domain.contains('/') {
            return Err(ValidationError::InvalidStoreDomain);
        }
        if self.access_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("COMMERCE__ACCESS_TOKEN"));
        }
        if self.timeout_ms == 0 || self.timeout_ms > 60_000 {
            return Err(ValidationError::InvalidOutboundTimeout("commerce"));
        }
        if self.renewal_window_days == 0 || self.renewal_window_days > 30 {
            return Err(ValidationError::InvalidRenewalWindow);
        }
        Ok(())
    }
}

fn default_api_version() -> String {
    "2024-01".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_renewal_window_days() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CommerceConfig {
        CommerceConfig {
            store_domain: "coffee-club.myshopify.com".to_string(),
            access_token: SecretString::new("shpat_xxx".to_string()),
            api_version: default_api_version(),
            timeout_ms: default_timeout_ms(),
            renewal_window_days: default_renewal_window_days(),
        }
    }

    #[test]
    fn test_graphql_endpoint() {
        assert_eq!(
            valid().graphql_endpoint(),
            "https://coffee-club.myshopify.com/api/2024-01/graphql.json"
        );
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_store_domain_with_scheme_rejected() {
        let config = CommerceConfig {
            store_domain: "https://coffee-club.myshopify.com".to_string(),
            ..valid()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidStoreDomain));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = CommerceConfig {
            timeout_ms: 0,
            ..valid()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidOutboundTimeout("commerce"))
        );
    }
}
