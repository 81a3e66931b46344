//! # Form Record
//!
//! The mutable aggregate of everything collected during one onboarding
//! attempt. Fields are private; every mutation goes through a typed setter
//! so the record's invariants hold after each call:
//!
//! - The keys of `licenses` are exactly the members of `product_types`.
//!   Toggling a product type adds or removes its license entry in the same
//!   call. Deserialization rejects snapshots that break this.
//! - The four lookup-derived bank fields (`bank_name`, `branch`,
//!   `bank_state`, `bank_district`) are replaced together by
//!   [`FormRecord::apply_bank_details`] and cleared together whenever the
//!   IFSC changes. They are never partially merged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use onboard_core::{
    BankAccount, BankDetails, BusinessType, CompanyDetails, CoordinatorDetails, DocumentSet,
    FileHandle, Ifsc, LicenseEntry, ProductType, SellerApplication, ValidationError,
};

use crate::wizard::WizardStep;

// ─── Fields ──────────────────────────────────────────────────────────

/// Free-text fields of the record, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CompanyName,
    Gstin,
    AddressLine,
    City,
    State,
    Pincode,
    Phone,
    CoordinatorName,
    CoordinatorDesignation,
    CoordinatorEmail,
    CoordinatorMobile,
    AccountHolder,
    AccountNumber,
    ConfirmAccountNumber,
    Ifsc,
    BankName,
    Branch,
    BankState,
    BankDistrict,
}

impl Field {
    pub const ALL: [Field; 19] = [
        Self::CompanyName,
        Self::Gstin,
        Self::AddressLine,
        Self::City,
        Self::State,
        Self::Pincode,
        Self::Phone,
        Self::CoordinatorName,
        Self::CoordinatorDesignation,
        Self::CoordinatorEmail,
        Self::CoordinatorMobile,
        Self::AccountHolder,
        Self::AccountNumber,
        Self::ConfirmAccountNumber,
        Self::Ifsc,
        Self::BankName,
        Self::Branch,
        Self::BankState,
        Self::BankDistrict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyName => "company_name",
            Self::Gstin => "gstin",
            Self::AddressLine => "address_line",
            Self::City => "city",
            Self::State => "state",
            Self::Pincode => "pincode",
            Self::Phone => "phone",
            Self::CoordinatorName => "coordinator_name",
            Self::CoordinatorDesignation => "coordinator_designation",
            Self::CoordinatorEmail => "coordinator_email",
            Self::CoordinatorMobile => "coordinator_mobile",
            Self::AccountHolder => "account_holder",
            Self::AccountNumber => "account_number",
            Self::ConfirmAccountNumber => "confirm_account_number",
            Self::Ifsc => "ifsc",
            Self::BankName => "bank_name",
            Self::Branch => "branch",
            Self::BankState => "bank_state",
            Self::BankDistrict => "bank_district",
        }
    }

    /// The wizard step whose screen owns this field.
    pub fn step(&self) -> WizardStep {
        match self {
            Self::CompanyName
            | Self::Gstin
            | Self::AddressLine
            | Self::City
            | Self::State
            | Self::Pincode
            | Self::Phone => WizardStep::COMPANY,
            Self::CoordinatorName
            | Self::CoordinatorDesignation
            | Self::CoordinatorEmail
            | Self::CoordinatorMobile => WizardStep::COORDINATOR,
            Self::AccountHolder
            | Self::AccountNumber
            | Self::ConfirmAccountNumber
            | Self::Ifsc
            | Self::BankName
            | Self::Branch
            | Self::BankState
            | Self::BankDistrict => WizardStep::BANK,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Field {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ValidationError::Unknown {
                kind: "field",
                value: s.to_string(),
            })
    }
}

/// Single-file upload slots outside the license entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSlot {
    GstCertificate,
    CancelledCheque,
}

impl FileSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GstCertificate => "gst_certificate",
            Self::CancelledCheque => "cancelled_cheque",
        }
    }
}

impl std::str::FromStr for FileSlot {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gst_certificate" => Ok(Self::GstCertificate),
            "cancelled_cheque" => Ok(Self::CancelledCheque),
            other => Err(ValidationError::Unknown {
                kind: "file slot",
                value: other.to_string(),
            }),
        }
    }
}

/// What a text write did beyond storing the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEffect {
    Stored,
    /// The IFSC now has the full format; the bank directory should be asked.
    LookupDue(Ifsc),
    /// The IFSC is incomplete; the bank fields were emptied.
    BankCleared,
}

/// Errors from record mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("product type \"{0}\" is not selected")]
    ProductTypeNotSelected(String),

    #[error("license entries {licenses:?} do not match selected product types {selected:?}")]
    LicenseKeysMismatch {
        selected: Vec<String>,
        licenses: Vec<String>,
    },
}

// ─── Record ──────────────────────────────────────────────────────────

/// Everything the seller has entered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordSnapshot")]
pub struct FormRecord {
    company: CompanyDetails,
    coordinator: CoordinatorDetails,
    documents: DocumentSet,
    bank: BankAccount,
    terms_accepted: bool,
}

/// Unchecked shape used only while deserializing.
#[derive(Deserialize)]
struct RecordSnapshot {
    #[serde(default)]
    company: CompanyDetails,
    #[serde(default)]
    coordinator: CoordinatorDetails,
    #[serde(default)]
    documents: DocumentSet,
    #[serde(default)]
    bank: BankAccount,
    #[serde(default)]
    terms_accepted: bool,
}

impl TryFrom<RecordSnapshot> for FormRecord {
    type Error = RecordError;

    fn try_from(s: RecordSnapshot) -> Result<Self, Self::Error> {
        let record = Self {
            company: s.company,
            coordinator: s.coordinator,
            documents: s.documents,
            bank: s.bank,
            terms_accepted: s.terms_accepted,
        };
        if !record.licenses_in_sync() {
            return Err(RecordError::LicenseKeysMismatch {
                selected: record
                    .documents
                    .product_types
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
                licenses: record
                    .documents
                    .licenses
                    .keys()
                    .map(|p| p.to_string())
                    .collect(),
            });
        }
        Ok(record)
    }
}

impl FormRecord {
    /// An empty record, as created when the wizard mounts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn company(&self) -> &CompanyDetails {
        &self.company
    }

    pub fn coordinator(&self) -> &CoordinatorDetails {
        &self.coordinator
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn bank(&self) -> &BankAccount {
        &self.bank
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    /// Current text of a field.
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::CompanyName => &self.company.company_name,
            Field::Gstin => &self.company.gstin,
            Field::AddressLine => &self.company.address_line,
            Field::City => &self.company.city,
            Field::State => &self.company.state,
            Field::Pincode => &self.company.pincode,
            Field::Phone => &self.company.phone,
            Field::CoordinatorName => &self.coordinator.name,
            Field::CoordinatorDesignation => &self.coordinator.designation,
            Field::CoordinatorEmail => &self.coordinator.email,
            Field::CoordinatorMobile => &self.coordinator.mobile,
            Field::AccountHolder => &self.bank.account_holder,
            Field::AccountNumber => &self.bank.account_number,
            Field::ConfirmAccountNumber => &self.bank.confirm_account_number,
            Field::Ifsc => &self.bank.ifsc,
            Field::BankName => &self.bank.bank_name,
            Field::Branch => &self.bank.branch,
            Field::BankState => &self.bank.bank_state,
            Field::BankDistrict => &self.bank.bank_district,
        }
    }

    fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::CompanyName => &mut self.company.company_name,
            Field::Gstin => &mut self.company.gstin,
            Field::AddressLine => &mut self.company.address_line,
            Field::City => &mut self.company.city,
            Field::State => &mut self.company.state,
            Field::Pincode => &mut self.company.pincode,
            Field::Phone => &mut self.company.phone,
            Field::CoordinatorName => &mut self.coordinator.name,
            Field::CoordinatorDesignation => &mut self.coordinator.designation,
            Field::CoordinatorEmail => &mut self.coordinator.email,
            Field::CoordinatorMobile => &mut self.coordinator.mobile,
            Field::AccountHolder => &mut self.bank.account_holder,
            Field::AccountNumber => &mut self.bank.account_number,
            Field::ConfirmAccountNumber => &mut self.bank.confirm_account_number,
            Field::Ifsc => &mut self.bank.ifsc,
            Field::BankName => &mut self.bank.bank_name,
            Field::Branch => &mut self.bank.branch,
            Field::BankState => &mut self.bank.bank_state,
            Field::BankDistrict => &mut self.bank.bank_district,
        }
    }

    /// Write a text field.
    ///
    /// The IFSC is trimmed and upper-cased. A changed IFSC empties the
    /// bank fields; a complete one reports [`FieldEffect::LookupDue`].
    pub fn set_text(&mut self, field: Field, value: impl Into<String>) -> FieldEffect {
        let value = value.into();
        if field != Field::Ifsc {
            *self.text_mut(field) = value;
            return FieldEffect::Stored;
        }

        let normalised = value.trim().to_ascii_uppercase();
        if normalised != self.bank.ifsc {
            self.clear_bank_details();
        }
        self.bank.ifsc = normalised;
        match Ifsc::new(self.bank.ifsc.as_str()) {
            Ok(code) => FieldEffect::LookupDue(code),
            Err(_) => {
                self.clear_bank_details();
                FieldEffect::BankCleared
            }
        }
    }

    pub fn set_business_type(&mut self, business_type: Option<BusinessType>) {
        self.company.business_type = business_type;
    }

    /// Select or deselect a product type. Returns whether it is selected
    /// afterwards.
    ///
    /// Selecting creates an empty license entry for the label; deselecting
    /// drops the entry along with any number or file it held.
    pub fn toggle_product_type(&mut self, product_type: ProductType) -> bool {
        if self.documents.product_types.remove(&product_type) {
            self.documents.licenses.remove(&product_type);
            false
        } else {
            self.documents
                .licenses
                .insert(product_type.clone(), LicenseEntry::default());
            self.documents.product_types.insert(product_type);
            true
        }
    }

    pub fn set_license_number(
        &mut self,
        product_type: &ProductType,
        number: impl Into<String>,
    ) -> Result<(), RecordError> {
        self.license_mut(product_type)?.number = number.into();
        Ok(())
    }

    pub fn set_license_file(
        &mut self,
        product_type: &ProductType,
        file: Option<FileHandle>,
    ) -> Result<(), RecordError> {
        self.license_mut(product_type)?.file = file;
        Ok(())
    }

    fn license_mut(&mut self, product_type: &ProductType) -> Result<&mut LicenseEntry, RecordError> {
        self.documents
            .licenses
            .get_mut(product_type)
            .ok_or_else(|| RecordError::ProductTypeNotSelected(product_type.to_string()))
    }

    pub fn set_file(&mut self, slot: FileSlot, file: Option<FileHandle>) {
        match slot {
            FileSlot::GstCertificate => self.documents.gst_file = file,
            FileSlot::CancelledCheque => self.bank.cancelled_cheque_file = file,
        }
    }

    /// Replace all four bank fields with a lookup result.
    pub fn apply_bank_details(&mut self, details: BankDetails) {
        self.bank.bank_name = details.bank_name;
        self.bank.branch = details.branch;
        self.bank.bank_state = details.state;
        self.bank.bank_district = details.district;
    }

    /// Empty all four bank fields.
    pub fn clear_bank_details(&mut self) {
        self.apply_bank_details(BankDetails::default());
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    /// Whether the license keys equal the selected product types.
    pub fn licenses_in_sync(&self) -> bool {
        self.documents
            .licenses
            .keys()
            .eq(self.documents.product_types.iter())
    }

    /// Build the payload for the submission collaborator.
    pub fn to_application(&self) -> SellerApplication {
        SellerApplication {
            company: self.company.clone(),
            coordinator: self.coordinator.clone(),
            documents: self.documents.clone(),
            bank: self.bank.clone(),
            terms_accepted: self.terms_accepted,
        }
    }
}
