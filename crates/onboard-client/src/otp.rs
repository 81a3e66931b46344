//! Typed client for the OTP service.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `/otp/api/v1/send` | Deliver a code to a destination |
//! | POST | `/otp/api/v1/verify` | Check a code for a destination |
//!
//! A verify answered with `{"verified": false}` or any 4xx other than 429
//! is a mismatch. 429, 5xx and transport errors are service failures.

use serde::{Deserialize, Serialize};

use onboard_core::{Channel, VerifyOutcome};

use crate::error::ClientError;

const API_PREFIX: &str = "otp/api/v1";

#[derive(Debug, Serialize)]
pub struct SendOtpRequest<'a> {
    pub channel: Channel,
    pub destination: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub channel: Channel,
    pub destination: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyOtpResponse {
    verified: bool,
}

#[derive(Debug, Clone)]
pub struct OtpClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl OtpClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Calls `POST {base_url}/otp/api/v1/send`. Not retried.
    pub async fn send(&self, channel: Channel, destination: &str) -> Result<(), ClientError> {
        let endpoint = "POST /otp/send";
        let url = format!("{}{}/send", self.base_url, API_PREFIX);
        let req = SendOtpRequest {
            channel,
            destination,
        };

        let resp = self
            .http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        crate::ensure_success(resp, endpoint).await?;
        Ok(())
    }

    /// Calls `POST {base_url}/otp/api/v1/verify`. Not retried.
    pub async fn verify(
        &self,
        channel: Channel,
        destination: &str,
        code: &str,
    ) -> Result<VerifyOutcome, ClientError> {
        let endpoint = "POST /otp/verify";
        let url = format!("{}{}/verify", self.base_url, API_PREFIX);
        let req = VerifyOtpRequest {
            channel,
            destination,
            code,
        };

        let resp = self
            .http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let status = resp.status();
        if status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::debug!(status = status.as_u16(), %channel, "OTP verify rejected code");
            return Ok(VerifyOutcome::Mismatch);
        }
        let resp = crate::ensure_success(resp, endpoint).await?;

        let body: VerifyOtpResponse =
            resp.json().await.map_err(|e| ClientError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;
        Ok(if body.verified {
            VerifyOutcome::Verified
        } else {
            VerifyOutcome::Mismatch
        })
    }
}
