//! In-memory collaborators for tests and local development.
//!
//! [`MockOtpGateway`] issues a random code per destination and only
//! verifies that code; there is no fixed code that always passes. Tests
//! read the issued code back with [`MockOtpGateway::issued_code`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use onboard_core::{
    ApplicationId, BankDetails, Channel, Ifsc, NewProduct, ReviewDecision, SellerApplication,
    SellerDetail, SubmissionReceipt, VerifyOutcome,
};

use crate::gateway::{
    BankDirectory, CatalogGateway, GatewayError, OtpGateway, ReviewGateway, SubmissionGateway,
};
use crate::sellers::CreatedProduct;

fn random_code() -> String {
    format!("{:06}", uuid::Uuid::new_v4().as_u128() % 1_000_000)
}

// ─── OTP ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockOtpGateway {
    issued: Mutex<HashMap<(Channel, String), String>>,
    fail_next: Mutex<Option<String>>,
    delay: Option<Duration>,
}

impl MockOtpGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every send and verify after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The code last sent to `destination`.
    pub fn issued_code(&self, channel: Channel, destination: &str) -> Option<String> {
        self.issued
            .lock()
            .get(&(channel, destination.to_string()))
            .cloned()
    }

    /// Make the next send or verify fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock() = Some(message.into());
    }

    fn take_failure(&self) -> Result<(), GatewayError> {
        match self.fail_next.lock().take() {
            Some(message) => Err(GatewayError::Rejected(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl OtpGateway for MockOtpGateway {
    async fn send_otp(&self, channel: Channel, destination: &str) -> Result<(), GatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.take_failure()?;
        let code = random_code();
        tracing::debug!(%channel, destination, "mock OTP issued");
        self.issued
            .lock()
            .insert((channel, destination.to_string()), code);
        Ok(())
    }

    async fn verify_otp(
        &self,
        channel: Channel,
        destination: &str,
        code: &str,
    ) -> Result<VerifyOutcome, GatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.take_failure()?;
        let issued = self.issued_code(channel, destination);
        Ok(if issued.as_deref() == Some(code) {
            VerifyOutcome::Verified
        } else {
            VerifyOutcome::Mismatch
        })
    }

    fn gateway_name(&self) -> &str {
        "MockOtpGateway"
    }
}

// ─── Bank directory ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockBankDirectory {
    entries: Mutex<HashMap<Ifsc, BankDetails>>,
    delay: Option<Duration>,
}

impl MockBankDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, ifsc: Ifsc, details: BankDetails) -> Self {
        self.entries.lock().insert(ifsc, details);
        self
    }

    /// Answer every lookup after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl BankDirectory for MockBankDirectory {
    async fn lookup(&self, ifsc: &Ifsc) -> Result<Option<BankDetails>, GatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.entries.lock().get(ifsc).cloned())
    }

    fn gateway_name(&self) -> &str {
        "MockBankDirectory"
    }
}

// ─── Seller service ──────────────────────────────────────────────────

/// A decision recorded by [`MockSellerService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDecision {
    pub id: ApplicationId,
    pub decision: ReviewDecision,
    pub comment: String,
}

/// Applications, review decisions and catalog listings in one store.
#[derive(Debug, Default)]
pub struct MockSellerService {
    applications: Mutex<HashMap<ApplicationId, (SellerApplication, Option<String>)>>,
    decisions: Mutex<Vec<RecordedDecision>>,
    products: Mutex<Vec<(ApplicationId, NewProduct)>>,
    sequence: AtomicU64,
    reject_next: Mutex<Option<String>>,
    delay: Option<Duration>,
}

impl MockSellerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept submissions only after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next call fail with `message`.
    pub fn reject_next(&self, message: impl Into<String>) {
        *self.reject_next.lock() = Some(message.into());
    }

    /// Store an application directly, bypassing the wizard.
    pub fn seed(&self, application: SellerApplication) -> Result<ApplicationId, GatewayError> {
        let id = self.next_id("APP")?;
        self.applications
            .lock()
            .insert(id.clone(), (application, None));
        Ok(id)
    }

    pub fn decisions(&self) -> Vec<RecordedDecision> {
        self.decisions.lock().clone()
    }

    pub fn products(&self) -> Vec<(ApplicationId, NewProduct)> {
        self.products.lock().clone()
    }

    fn take_rejection(&self) -> Result<(), GatewayError> {
        match self.reject_next.lock().take() {
            Some(message) => Err(GatewayError::Rejected(message)),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> Result<ApplicationId, GatewayError> {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1001;
        ApplicationId::new(format!("{prefix}-{n}"))
            .map_err(|e| GatewayError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl SubmissionGateway for MockSellerService {
    async fn submit(
        &self,
        application: &SellerApplication,
    ) -> Result<SubmissionReceipt, GatewayError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.take_rejection()?;
        let id = self.seed(application.clone())?;
        Ok(SubmissionReceipt {
            application_id: id,
            submitted_at: Utc::now(),
        })
    }
}

#[async_trait]
impl ReviewGateway for MockSellerService {
    async fn fetch_seller_detail(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<SellerDetail>, GatewayError> {
        self.take_rejection()?;
        let applications = self.applications.lock();
        Ok(applications.get(id).map(|(app, status)| SellerDetail {
            application_id: id.clone(),
            company_name: app.company.company_name.clone(),
            business_type: app.company.business_type,
            gstin: app.company.gstin.clone(),
            coordinator: app.coordinator.clone(),
            product_types: app.documents.product_types.iter().cloned().collect(),
            documents: app.document_refs(),
            status: status.clone().or_else(|| Some("pending_review".to_string())),
        }))
    }

    async fn submit_review_decision(
        &self,
        id: &ApplicationId,
        decision: ReviewDecision,
        comment: &str,
    ) -> Result<(), GatewayError> {
        self.take_rejection()?;
        let mut applications = self.applications.lock();
        let (_, status) = applications
            .get_mut(id)
            .ok_or_else(|| GatewayError::Rejected(format!("Unknown application {id}")))?;
        *status = Some(decision.as_str().to_string());
        self.decisions.lock().push(RecordedDecision {
            id: id.clone(),
            decision,
            comment: comment.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl CatalogGateway for MockSellerService {
    async fn create_product(
        &self,
        seller: &ApplicationId,
        product: &NewProduct,
    ) -> Result<CreatedProduct, GatewayError> {
        self.take_rejection()?;
        let id = self.next_id("PRD")?;
        self.products.lock().push((seller.clone(), product.clone()));
        Ok(CreatedProduct {
            product_id: id.to_string(),
        })
    }
}
