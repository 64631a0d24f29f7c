//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid {0} timeout (must be 1..=60000 ms)")]
    InvalidOutboundTimeout(&'static str),

    #[error("Public URL must start with http:// or https://")]
    InvalidPublicUrl,

    #[error("Public URL must use HTTPS in production")]
    PublicUrlMustBeHttps,

    #[error("Store domain must be a bare host name without scheme or path")]
    InvalidStoreDomain,

    #[error("Invalid from email address")]
    InvalidFromEmail,

    #[error("Invalid support email address")]
    InvalidSupportEmail,

    #[error("Signature header name must not be empty")]
    EmptySignatureHeader,

    #[error("Ledger retention must be between 1 and 2160 hours")]
    InvalidLedgerRetention,

    #[error("Claim lease must be between 1 and 86400 seconds")]
    InvalidClaimLease,

    #[error("Claim lease must be longer than the request timeout")]
    ClaimLeaseShorterThanRequest,

    #[error("Renewal window must be between 1 and 30 days")]
    InvalidRenewalWindow,
}
