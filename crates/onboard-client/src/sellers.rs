//! Typed client for the seller service.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `/seller/api/v1/applications` | Submit an application |
//! | GET | `/seller/api/v1/applications/{id}` | Detail for review |
//! | POST | `/seller/api/v1/applications/{id}/review` | Record a decision |
//! | POST | `/seller/api/v1/sellers/{id}/products` | Create a listing |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use onboard_core::{
    ApplicationId, NewProduct, ReviewDecision, SellerApplication, SellerDetail, SubmissionReceipt,
};

use crate::error::ClientError;
use crate::retry::ReadRetry;

const API_PREFIX: &str = "seller/api/v1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    application_id: String,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ReviewDecisionRequest<'a> {
    pub decision: ReviewDecision,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub comment: &'a str,
}

/// Catalog acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProduct {
    pub product_id: String,
}

#[derive(Debug, Clone)]
pub struct SellerClient {
    http: reqwest::Client,
    base_url: url::Url,
    reads: ReadRetry,
}

impl SellerClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url, reads: ReadRetry) -> Self {
        Self {
            http,
            base_url,
            reads,
        }
    }

    /// Calls `POST {base_url}/seller/api/v1/applications`.
    pub async fn submit(
        &self,
        application: &SellerApplication,
    ) -> Result<SubmissionReceipt, ClientError> {
        let endpoint = "POST /applications";
        let url = format!("{}{}/applications", self.base_url, API_PREFIX);

        let resp = self
            .http
            .post(&url)
            .json(application)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        let resp = crate::ensure_success(resp, endpoint).await?;

        let body: SubmitResponse = resp.json().await.map_err(|e| ClientError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })?;
        let application_id = ApplicationId::new(body.application_id).map_err(|e| {
            ClientError::ApiError {
                endpoint: endpoint.into(),
                status: 200,
                body: e.to_string(),
            }
        })?;
        Ok(SubmissionReceipt {
            application_id,
            submitted_at: body.submitted_at.unwrap_or_else(Utc::now),
        })
    }

    /// Calls `GET {base_url}/seller/api/v1/applications/{id}`. `Ok(None)`
    /// on 404.
    pub async fn fetch_detail(&self, id: &ApplicationId) -> Result<Option<SellerDetail>, ClientError> {
        let endpoint = format!("GET /applications/{id}");
        let url = format!("{}{}/applications/{id}", self.base_url, API_PREFIX);

        let request = self.http.get(&url).build().map_err(|e| ClientError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        let resp = self.reads.send(&self.http, request, &endpoint).await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = crate::ensure_success(resp, &endpoint).await?;

        resp.json()
            .await
            .map(Some)
            .map_err(|e| ClientError::Deserialization {
                endpoint,
                source: e,
            })
    }

    /// Calls `POST {base_url}/seller/api/v1/applications/{id}/review`.
    pub async fn submit_review(
        &self,
        id: &ApplicationId,
        decision: ReviewDecision,
        comment: &str,
    ) -> Result<(), ClientError> {
        let endpoint = format!("POST /applications/{id}/review");
        let url = format!("{}{}/applications/{id}/review", self.base_url, API_PREFIX);
        let req = ReviewDecisionRequest { decision, comment };

        let resp = self
            .http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        crate::ensure_success(resp, &endpoint).await?;
        Ok(())
    }

    /// Calls `POST {base_url}/seller/api/v1/sellers/{id}/products`.
    pub async fn create_product(
        &self,
        seller: &ApplicationId,
        product: &NewProduct,
    ) -> Result<CreatedProduct, ClientError> {
        let endpoint = format!("POST /sellers/{seller}/products");
        let url = format!("{}{}/sellers/{seller}/products", self.base_url, API_PREFIX);

        let resp = self
            .http
            .post(&url)
            .json(product)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        let resp = crate::ensure_success(resp, &endpoint).await?;

        resp.json().await.map_err(|e| ClientError::Deserialization {
            endpoint,
            source: e,
        })
    }
}
