//! # Domain Types
//!
//! The sections of a seller application and the payloads exchanged with
//! external collaborators (OTP, bank directory, submission, review,
//! catalog).
//!
//! Section structs hold raw form text. Whether a field is acceptable is
//! decided by the step rules at the moment the user tries to advance, not
//! when the text is typed.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{ApplicationId, ProductType};
use crate::validators::{Pattern, Presence};

// ─── Files ───────────────────────────────────────────────────────────

/// Opaque reference to a client-selected upload.
///
/// The onboarding core never reads file bytes. It only tracks whether a
/// slot holds a handle; storage is owned by the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    /// Storage key issued by the upload collaborator.
    pub id: String,
    /// Original file name, for display.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileHandle {
    /// Create a handle. The storage key must be non-empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier { kind: "file id" });
        }
        Ok(Self {
            id,
            name: name.into(),
            content_type: None,
        })
    }
}

impl Presence for FileHandle {
    fn is_present(&self) -> bool {
        true
    }
}

// ─── Enumerations ────────────────────────────────────────────────────

/// How the seller trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    Manufacturer,
    Distributor,
    Wholesaler,
    Retailer,
    Importer,
}

impl BusinessType {
    pub const ALL: [BusinessType; 5] = [
        Self::Manufacturer,
        Self::Distributor,
        Self::Wholesaler,
        Self::Retailer,
        Self::Importer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manufacturer => "manufacturer",
            Self::Distributor => "distributor",
            Self::Wholesaler => "wholesaler",
            Self::Retailer => "retailer",
            Self::Importer => "importer",
        }
    }
}

impl std::fmt::Display for BusinessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BusinessType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::Unknown {
                kind: "business type",
                value: s.to_string(),
            })
    }
}

/// A verifiable contact method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Mobile,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Self::Email, Self::Mobile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Mobile => "mobile",
        }
    }

    /// Format a destination must have before a code can be sent to it.
    pub fn destination_pattern(&self) -> Pattern {
        match self {
            Self::Email => Pattern::Email,
            Self::Mobile => Pattern::Phone,
        }
    }

    /// Message shown when a send is requested for a malformed destination.
    pub fn invalid_destination_message(&self) -> &'static str {
        match self {
            Self::Email => "Please enter a valid email address",
            Self::Mobile => "Please enter a valid 10-digit mobile number",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "mobile" => Ok(Self::Mobile),
            other => Err(ValidationError::Unknown {
                kind: "channel",
                value: other.to_string(),
            }),
        }
    }
}

/// Admin decision on a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Accept,
    Reject,
    /// Send the application back to the seller for changes.
    Correction,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Correction => "correction",
        }
    }
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of the OTP collaborator on a submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    Verified,
    Mismatch,
}

// ─── Application sections ────────────────────────────────────────────

/// Step 1: company identity and address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyDetails {
    pub company_name: String,
    pub business_type: Option<BusinessType>,
    pub gstin: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone: String,
}

/// Step 2: the person the marketplace deals with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorDetails {
    pub name: String,
    pub designation: String,
    pub email: String,
    pub mobile: String,
}

/// License number and document for one product category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseEntry {
    pub number: String,
    pub file: Option<FileHandle>,
}

impl LicenseEntry {
    /// Both the number and the document are present.
    pub fn is_complete(&self) -> bool {
        self.number.is_present() && self.file.is_some()
    }
}

/// Step 3: GST certificate, product categories and their licenses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSet {
    pub gst_file: Option<FileHandle>,
    pub product_types: BTreeSet<ProductType>,
    pub licenses: BTreeMap<ProductType, LicenseEntry>,
}

/// Step 4: payout account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankAccount {
    pub account_holder: String,
    pub account_number: String,
    pub confirm_account_number: String,
    pub ifsc: String,
    pub bank_name: String,
    pub branch: String,
    pub bank_state: String,
    pub bank_district: String,
    pub cancelled_cheque_file: Option<FileHandle>,
}

impl BankAccount {
    /// The four lookup-derived fields as one value.
    pub fn details(&self) -> BankDetails {
        BankDetails {
            bank_name: self.bank_name.clone(),
            branch: self.branch.clone(),
            state: self.bank_state.clone(),
            district: self.bank_district.clone(),
        }
    }
}

/// Branch details resolved from an IFSC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub branch: String,
    pub state: String,
    pub district: String,
}

/// Payload handed to the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerApplication {
    pub company: CompanyDetails,
    pub coordinator: CoordinatorDetails,
    pub documents: DocumentSet,
    pub bank: BankAccount,
    pub terms_accepted: bool,
}

/// Acknowledgement returned by the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub application_id: ApplicationId,
    pub submitted_at: DateTime<Utc>,
}

// ─── Review ──────────────────────────────────────────────────────────

/// One reviewable upload on a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Stable line-item key (e.g. `gst_certificate`, `license:Drugs`).
    pub item_id: String,
    pub label: String,
    pub file: FileHandle,
}

/// Submitted application as seen by the review console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerDetail {
    pub application_id: ApplicationId,
    pub company_name: String,
    #[serde(default)]
    pub business_type: Option<BusinessType>,
    #[serde(default)]
    pub gstin: String,
    #[serde(default)]
    pub coordinator: CoordinatorDetails,
    #[serde(default)]
    pub product_types: Vec<ProductType>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub status: Option<String>,
}

impl SellerApplication {
    /// Review line items for every upload in this application, in a fixed
    /// order: GST certificate, licenses by category, cancelled cheque.
    pub fn document_refs(&self) -> Vec<DocumentRef> {
        let mut refs = Vec::new();
        if let Some(file) = &self.documents.gst_file {
            refs.push(DocumentRef {
                item_id: "gst_certificate".to_string(),
                label: "GST certificate".to_string(),
                file: file.clone(),
            });
        }
        for (product_type, entry) in &self.documents.licenses {
            if let Some(file) = &entry.file {
                refs.push(DocumentRef {
                    item_id: format!("license:{product_type}"),
                    label: format!("{product_type} license ({})", entry.number.trim()),
                    file: file.clone(),
                });
            }
        }
        if let Some(file) = &self.bank.cancelled_cheque_file {
            refs.push(DocumentRef {
                item_id: "cancelled_cheque".to_string(),
                label: "Cancelled cheque".to_string(),
                file: file.clone(),
            });
        }
        refs
    }
}

// ─── Catalog ─────────────────────────────────────────────────────────

/// A validated product listing ready for the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub product_type: ProductType,
    pub manufacturer: String,
    pub pack_size: String,
    pub hsn_code: String,
    /// Maximum retail price in paise.
    pub mrp_paise: u64,
    pub prescription_required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str) -> FileHandle {
        FileHandle::new(id, format!("{id}.pdf")).unwrap()
    }

    #[test]
    fn file_handle_requires_id() {
        assert!(FileHandle::new("", "x.pdf").is_err());
        assert!(FileHandle::new("f-1", "x.pdf").is_ok());
    }

    #[test]
    fn business_type_parses_case_insensitively() {
        assert_eq!("Distributor".parse::<BusinessType>().unwrap(), BusinessType::Distributor);
        assert!("broker".parse::<BusinessType>().is_err());
    }

    #[test]
    fn channel_round_trips_through_str() {
        for ch in Channel::ALL {
            assert_eq!(ch.as_str().parse::<Channel>().unwrap(), ch);
        }
        assert!("fax".parse::<Channel>().is_err());
    }

    #[test]
    fn license_entry_completeness() {
        let mut entry = LicenseEntry::default();
        assert!(!entry.is_complete());
        entry.number = "DL-123".to_string();
        assert!(!entry.is_complete());
        entry.file = Some(file("lic"));
        assert!(entry.is_complete());
        entry.number = "  ".to_string();
        assert!(!entry.is_complete());
    }

    #[test]
    fn document_refs_list_every_upload() {
        let drugs = ProductType::new("Drugs").unwrap();
        let mut documents = DocumentSet {
            gst_file: Some(file("gst")),
            ..Default::default()
        };
        documents.product_types.insert(drugs.clone());
        documents.licenses.insert(
            drugs,
            LicenseEntry {
                number: "DL-1".to_string(),
                file: Some(file("dl")),
            },
        );
        let app = SellerApplication {
            company: CompanyDetails::default(),
            coordinator: CoordinatorDetails::default(),
            documents,
            bank: BankAccount {
                cancelled_cheque_file: Some(file("chq")),
                ..Default::default()
            },
            terms_accepted: true,
        };
        let ids: Vec<String> = app.document_refs().into_iter().map(|d| d.item_id).collect();
        assert_eq!(ids, vec!["gst_certificate", "license:Drugs", "cancelled_cheque"]);
    }

    #[test]
    fn seller_detail_tolerates_missing_optional_fields() {
        let detail: SellerDetail = serde_json::from_value(serde_json::json!({
            "application_id": "APP-9",
            "company_name": "Acme Pharma"
        }))
        .unwrap();
        assert!(detail.documents.is_empty());
        assert_eq!(detail.application_id.as_str(), "APP-9");
    }
}
