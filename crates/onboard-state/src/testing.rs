//! Fixtures shared by unit tests here and by downstream test crates.

use onboard_core::{BankDetails, BusinessType, FileHandle, ProductType};

use crate::record::{Field, FileSlot, FormRecord};
use crate::rules::AuxState;

pub const GSTIN: &str = "27AAPFU0939F1ZV";
pub const EMAIL: &str = "ops@acme.in";
pub const MOBILE: &str = "9876543210";
pub const IFSC: &str = "SBIN0005943";

/// A file handle named after its id.
pub fn file(id: &str) -> FileHandle {
    FileHandle::new(id, format!("{id}.pdf")).expect("fixture file id is non-empty")
}

pub fn sbi_details() -> BankDetails {
    BankDetails {
        bank_name: "State Bank of India".to_string(),
        branch: "Koramangala".to_string(),
        state: "Karnataka".to_string(),
        district: "Bengaluru Urban".to_string(),
    }
}

/// Company step only.
pub fn company_record() -> FormRecord {
    let mut record = FormRecord::new();
    record.set_text(Field::CompanyName, "Acme Pharma Pvt Ltd");
    record.set_business_type(Some(BusinessType::Distributor));
    record.set_text(Field::Gstin, GSTIN);
    record.set_text(Field::AddressLine, "12 Residency Road");
    record.set_text(Field::City, "Bengaluru");
    record.set_text(Field::State, "Karnataka");
    record.set_text(Field::Pincode, "560001");
    record.set_text(Field::Phone, "8012345678");
    record
}

/// A record that passes every step when paired with [`complete_aux`].
pub fn complete_record() -> FormRecord {
    let mut record = company_record();
    record.set_text(Field::CoordinatorName, "Priya Rao");
    record.set_text(Field::CoordinatorDesignation, "Compliance Lead");
    record.set_text(Field::CoordinatorEmail, EMAIL);
    record.set_text(Field::CoordinatorMobile, MOBILE);

    record.set_file(FileSlot::GstCertificate, Some(file("gst")));
    let drugs = ProductType::new("Drugs").expect("fixture product type");
    record.toggle_product_type(drugs.clone());
    record
        .set_license_number(&drugs, "KA-B1-20B-12345")
        .expect("selected above");
    record
        .set_license_file(&drugs, Some(file("drug-license")))
        .expect("selected above");

    record.set_text(Field::AccountHolder, "Acme Pharma Pvt Ltd");
    record.set_text(Field::AccountNumber, "123456789012");
    record.set_text(Field::ConfirmAccountNumber, "123456789012");
    record.set_text(Field::Ifsc, IFSC);
    record.apply_bank_details(sbi_details());
    record.set_file(FileSlot::CancelledCheque, Some(file("cheque")));

    record.set_terms_accepted(true);
    record
}

/// Both channels verified, no lookup outstanding.
pub fn complete_aux() -> AuxState {
    AuxState {
        email_verified: true,
        mobile_verified: true,
        bank_lookup_pending: false,
        bank_lookup_error: None,
    }
}
