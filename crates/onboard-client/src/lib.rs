//! # onboard-client: Typed clients for the onboarding collaborators
//!
//! - **OTP** delivery and verification (`/otp/api/v1/...`)
//! - **IFSC** bank directory (`/ifsc/api/v1/...`)
//! - **Seller service**: application submission, review decisions and
//!   catalog listings (`/seller/api/v1/...`)
//!
//! The onboarding API talks to these through the traits in [`gateway`],
//! which the HTTP clients here implement. [`mock`] has in-memory
//! implementations for tests and local runs.
//!
//! ## Retry policy
//!
//! Reads (IFSC lookup, seller detail) retry connect failures, timeouts and
//! 502/503/504 answers with exponential backoff, bounded by the client
//! timeout. Writes are sent once.

pub mod bank;
pub mod config;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod otp;
pub(crate) mod retry;
pub mod sellers;

pub use config::OnboardApiConfig;
pub use error::ClientError;
pub use gateway::{
    BankDirectory, CatalogGateway, GatewayError, OtpGateway, ReviewGateway, SubmissionGateway,
};
pub use sellers::CreatedProduct;

use std::time::Duration;

/// Top-level client holding one sub-client per collaborator.
#[derive(Debug, Clone)]
pub struct OnboardClient {
    otp: otp::OtpClient,
    bank: bank::BankClient,
    sellers: sellers::SellerClient,
}

impl OnboardClient {
    pub fn new(config: OnboardApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let mut auth = reqwest::header::HeaderValue::from_str(&format!(
                    "Bearer {}",
                    config.api_token.as_str()
                ))
                .map_err(|_| ClientError::Config(config::ConfigError::MissingToken))?;
                auth.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, auth);
                headers
            })
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let reads = retry::ReadRetry::within(Duration::from_secs(config.timeout_secs));
        Ok(Self {
            otp: otp::OtpClient::new(http.clone(), config.otp_url),
            bank: bank::BankClient::new(http.clone(), config.bank_url, reads),
            sellers: sellers::SellerClient::new(http, config.seller_url, reads),
        })
    }

    pub fn otp(&self) -> &otp::OtpClient {
        &self.otp
    }

    pub fn bank(&self) -> &bank::BankClient {
        &self.bank
    }

    pub fn sellers(&self) -> &sellers::SellerClient {
        &self.sellers
    }
}

/// Turn a non-2xx response into [`ClientError::ApiError`].
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<reqwest::Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(endpoint, status, "collaborator returned an error status");
    Err(ClientError::ApiError {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}
