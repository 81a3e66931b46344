//! Collaborator endpoint configuration.
//!
//! One base URL per collaborator service plus the shared bearer token.
//! Override via environment variables or explicit construction for
//! staging and tests.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for the onboarding collaborators.
///
/// Custom `Debug` redacts the `api_token` field.
#[derive(Clone)]
pub struct OnboardApiConfig {
    /// OTP delivery and verification service.
    pub otp_url: Url,
    /// IFSC bank directory.
    pub bank_url: Url,
    /// Seller service: applications, review decisions, catalog.
    pub seller_url: Url,
    /// Bearer token sent to every collaborator.
    pub api_token: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for OnboardApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnboardApiConfig")
            .field("otp_url", &self.otp_url)
            .field("bank_url", &self.bank_url)
            .field("seller_url", &self.seller_url)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OnboardApiConfig {
    /// Load configuration from environment variables.
    ///
    /// - `ONBOARD_OTP_URL` (default: `http://127.0.0.1:7001`)
    /// - `ONBOARD_BANK_URL` (default: `http://127.0.0.1:7002`)
    /// - `ONBOARD_SELLER_URL` (default: `http://127.0.0.1:7003`)
    /// - `ONBOARD_API_TOKEN` (required)
    /// - `ONBOARD_TIMEOUT_SECS` (default: 15)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("ONBOARD_API_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        if api_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        Ok(Self {
            otp_url: env_url("ONBOARD_OTP_URL", "http://127.0.0.1:7001")?,
            bank_url: env_url("ONBOARD_BANK_URL", "http://127.0.0.1:7002")?,
            seller_url: env_url("ONBOARD_SELLER_URL", "http://127.0.0.1:7003")?,
            api_token: Zeroizing::new(api_token),
            timeout_secs: std::env::var("ONBOARD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
        })
    }

    /// Point every collaborator at consecutive localhost ports starting
    /// at `base_port` (OTP, bank, seller).
    pub fn local_mock(base_port: u16, token: &str) -> Result<Self, ConfigError> {
        let make_url = |port: u16| -> Result<Url, ConfigError> {
            Url::parse(&format!("http://127.0.0.1:{port}"))
                .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))
        };
        Ok(Self {
            otp_url: make_url(base_port)?,
            bank_url: make_url(base_port + 1)?,
            seller_url: make_url(base_port + 2)?,
            api_token: Zeroizing::new(token.to_string()),
            timeout_secs: 5,
        })
    }

    /// Every collaborator at one base URL, e.g. a single mock server.
    pub fn single_host(base: Url, token: &str) -> Self {
        Self {
            otp_url: base.clone(),
            bank_url: base.clone(),
            seller_url: base,
            api_token: Zeroizing::new(token.to_string()),
            timeout_secs: 5,
        }
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ONBOARD_API_TOKEN environment variable is required")]
    MissingToken,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
