//! # Collaborator Gateways
//!
//! The narrow interfaces the onboarding service depends on. Production
//! wires in the HTTP clients of this crate; tests and local development
//! use the in-memory implementations in [`crate::mock`].
//!
//! Every trait is object-safe so the API can hold `Arc<dyn ..>`.

use async_trait::async_trait;

use onboard_core::{
    ApplicationId, BankDetails, Channel, Ifsc, NewProduct, ReviewDecision, SellerApplication,
    SellerDetail, SubmissionReceipt, VerifyOutcome,
};

use crate::bank::BankClient;
use crate::error::ClientError;
use crate::otp::OtpClient;
use crate::sellers::{CreatedProduct, SellerClient};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The collaborator refused the request and explained why.
    #[error("{0}")]
    Rejected(String),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl GatewayError {
    /// Text safe to show the user verbatim, if the collaborator gave any.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Rejected(message) => Some(message.clone()),
            Self::Unavailable(_) => None,
            Self::Client(e) => e.service_message(),
        }
    }
}

#[async_trait]
pub trait OtpGateway: Send + Sync {
    async fn send_otp(&self, channel: Channel, destination: &str) -> Result<(), GatewayError>;

    async fn verify_otp(
        &self,
        channel: Channel,
        destination: &str,
        code: &str,
    ) -> Result<VerifyOutcome, GatewayError>;

    fn gateway_name(&self) -> &str;
}

#[async_trait]
pub trait BankDirectory: Send + Sync {
    /// `Ok(None)` when the code is not in the directory.
    async fn lookup(&self, ifsc: &Ifsc) -> Result<Option<BankDetails>, GatewayError>;

    fn gateway_name(&self) -> &str;
}

#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, application: &SellerApplication)
        -> Result<SubmissionReceipt, GatewayError>;
}

#[async_trait]
pub trait ReviewGateway: Send + Sync {
    async fn fetch_seller_detail(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<SellerDetail>, GatewayError>;

    async fn submit_review_decision(
        &self,
        id: &ApplicationId,
        decision: ReviewDecision,
        comment: &str,
    ) -> Result<(), GatewayError>;
}

#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn create_product(
        &self,
        seller: &ApplicationId,
        product: &NewProduct,
    ) -> Result<CreatedProduct, GatewayError>;
}

// ─── HTTP implementations ────────────────────────────────────────────

#[async_trait]
impl OtpGateway for OtpClient {
    async fn send_otp(&self, channel: Channel, destination: &str) -> Result<(), GatewayError> {
        Ok(self.send(channel, destination).await?)
    }

    async fn verify_otp(
        &self,
        channel: Channel,
        destination: &str,
        code: &str,
    ) -> Result<VerifyOutcome, GatewayError> {
        Ok(self.verify(channel, destination, code).await?)
    }

    fn gateway_name(&self) -> &str {
        "OtpHttpClient"
    }
}

#[async_trait]
impl BankDirectory for BankClient {
    async fn lookup(&self, ifsc: &Ifsc) -> Result<Option<BankDetails>, GatewayError> {
        Ok(BankClient::lookup(self, ifsc).await?)
    }

    fn gateway_name(&self) -> &str {
        "IfscHttpClient"
    }
}

#[async_trait]
impl SubmissionGateway for SellerClient {
    async fn submit(
        &self,
        application: &SellerApplication,
    ) -> Result<SubmissionReceipt, GatewayError> {
        Ok(SellerClient::submit(self, application).await?)
    }
}

#[async_trait]
impl ReviewGateway for SellerClient {
    async fn fetch_seller_detail(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<SellerDetail>, GatewayError> {
        Ok(self.fetch_detail(id).await?)
    }

    async fn submit_review_decision(
        &self,
        id: &ApplicationId,
        decision: ReviewDecision,
        comment: &str,
    ) -> Result<(), GatewayError> {
        Ok(self.submit_review(id, decision, comment).await?)
    }
}

#[async_trait]
impl CatalogGateway for SellerClient {
    async fn create_product(
        &self,
        seller: &ApplicationId,
        product: &NewProduct,
    ) -> Result<CreatedProduct, GatewayError> {
        Ok(SellerClient::create_product(self, seller, product).await?)
    }
}
