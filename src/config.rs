//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Service configuration, populated from the environment in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the REST surface listens on.
    pub port: u16,
    /// Base URL of the host platform Admin API, e.g.
    /// `https://{shop}/admin/api/2024-10`. `{shop}` is substituted with
    /// the tenant's domain at request time.
    pub admin_api_url: String,
    /// Admin API access token. When absent the service runs against the
    /// in-memory store (dev mode).
    pub admin_token: Option<SecretString>,
    /// Metafield namespace all flags live under.
    pub namespace: String,
    /// Base URL of the partner-account backend.
    pub partner_api_url: String,
    /// Delay before the one-shot reconcile after onboarding completes.
    pub reconcile_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            admin_api_url: "https://{shop}/admin/api/2024-10".to_string(),
            admin_token: None,
            namespace: "shopfit".to_string(),
            partner_api_url: "https://partners.shopfit.dev".to_string(),
            reconcile_delay: Duration::from_secs(5),
        }
    }
}

impl AppConfig {
    /// Build the configuration from `SHOPFIT_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("SHOPFIT_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SHOPFIT_PORT".to_string(),
                message: format!("not a valid port: {raw}"),
            })?,
            Err(_) => defaults.port,
        };

        let reconcile_delay = match std::env::var("SHOPFIT_RECONCILE_DELAY_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "SHOPFIT_RECONCILE_DELAY_SECS".to_string(),
                    message: format!("not a valid number of seconds: {raw}"),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => defaults.reconcile_delay,
        };

        Ok(Self {
            port,
            admin_api_url: std::env::var("SHOPFIT_ADMIN_API_URL")
                .unwrap_or(defaults.admin_api_url),
            admin_token: std::env::var("SHOPFIT_ADMIN_TOKEN")
                .ok()
                .map(SecretString::from),
            namespace: std::env::var("SHOPFIT_NAMESPACE").unwrap_or(defaults.namespace),
            partner_api_url: std::env::var("SHOPFIT_PARTNER_API_URL")
                .unwrap_or(defaults.partner_api_url),
            reconcile_delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.namespace, "shopfit");
        assert!(config.admin_token.is_none());
        assert_eq!(config.reconcile_delay, Duration::from_secs(5));
    }
}
