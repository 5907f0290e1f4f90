//! Error types for shopfit.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Partner API error: {0}")]
    Partner(#[from] PartnerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Tenant-store errors.
///
/// Validation errors come back from the platform's `metafieldsSet`
/// `userErrors` and name the offending field; everything that never
/// reached the platform (network, TLS, malformed response body) is a
/// transport error. Both are recoverable: the step pointer stays put and
/// the UI shows a notice so the user can retry.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Remote validation failed for field {field:?}: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error("Missing tenant identity (shop)")]
    MissingTenant,

    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

/// Partner-account backend errors.
#[derive(Debug, thiserror::Error)]
pub enum PartnerError {
    #[error("Partner API request failed: {0}")]
    RequestFailed(String),

    #[error("Unknown partner {partner_id}; account must be recreated")]
    UnknownPartner { partner_id: String },

    #[error("Invalid response from partner API: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for PartnerError {
    fn from(e: reqwest::Error) -> Self {
        PartnerError::RequestFailed(e.to_string())
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
