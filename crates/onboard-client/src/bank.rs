//! Typed client for the IFSC bank directory.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/ifsc/api/v1/{code}` | Branch details for an IFSC |

use serde::Deserialize;

use onboard_core::{BankDetails, Ifsc};

use crate::error::ClientError;
use crate::retry::ReadRetry;

const API_PREFIX: &str = "ifsc/api/v1";

/// Directory record. Extra fields (MICR, address, UPI flags) are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    #[serde(alias = "BANK")]
    pub bank_name: String,
    #[serde(alias = "BRANCH")]
    pub branch: String,
    #[serde(default, alias = "STATE")]
    pub state: String,
    #[serde(default, alias = "DISTRICT")]
    pub district: String,
}

impl From<BranchRecord> for BankDetails {
    fn from(r: BranchRecord) -> Self {
        Self {
            bank_name: r.bank_name,
            branch: r.branch,
            state: r.state,
            district: r.district,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BankClient {
    http: reqwest::Client,
    base_url: url::Url,
    reads: ReadRetry,
}

impl BankClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url, reads: ReadRetry) -> Self {
        Self {
            http,
            base_url,
            reads,
        }
    }

    /// Calls `GET {base_url}/ifsc/api/v1/{code}`. `Ok(None)` on 404.
    pub async fn lookup(&self, ifsc: &Ifsc) -> Result<Option<BankDetails>, ClientError> {
        let endpoint = format!("GET /ifsc/{ifsc}");
        let url = format!("{}{}/{}", self.base_url, API_PREFIX, ifsc);

        let request = self.http.get(&url).build().map_err(|e| ClientError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        let resp = self.reads.send(&self.http, request, &endpoint).await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = crate::ensure_success(resp, &endpoint).await?;

        resp.json::<BranchRecord>()
            .await
            .map(|r| Some(r.into()))
            .map_err(|e| ClientError::Deserialization {
                endpoint,
                source: e,
            })
    }
}
