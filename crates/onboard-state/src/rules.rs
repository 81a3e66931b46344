//! # Step Validation Rules
//!
//! One declarative rule list per wizard step. A rule is either a field
//! check (a field, a validator from `onboard_core::validators`, and the
//! message to show) or a derived check spanning several fields or
//! auxiliary state (verified channels, license completeness, the IFSC
//! lookup outcome).
//!
//! [`validate_step`] evaluates a step's rules in declaration order and
//! returns the **first** failure. The user sees one message at a time.

use serde::Serialize;
use thiserror::Error;

use onboard_core::{
    length_at_least, length_exactly, matches_pattern, required, Channel, Pattern, ProductType,
};

use crate::record::{Field, FileSlot, FormRecord};
use crate::wizard::WizardStep;

/// Minimum digits in a bank account number.
pub const MIN_ACCOUNT_DIGITS: usize = 9;

/// State outside the record that some rules consult.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxState {
    pub email_verified: bool,
    pub mobile_verified: bool,
    /// An IFSC lookup is outstanding.
    pub bank_lookup_pending: bool,
    /// Message from the last IFSC lookup, if it failed or found nothing.
    pub bank_lookup_error: Option<String>,
}

impl AuxState {
    pub fn channel_verified(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email_verified,
            Channel::Mobile => self.mobile_verified,
        }
    }
}

/// The first rule a step failed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ValidationFailure {
    pub step: WizardStep,
    /// Field to focus, when the failure belongs to one.
    pub field: Option<String>,
    pub message: String,
}

// ─── Rule tables ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Check {
    Required,
    /// Trimmed value matches the pattern.
    Format(Pattern),
    /// Trimmed, upper-cased value matches the pattern.
    FormatIgnoringCase(Pattern),
    DigitsExactly(usize),
    DigitsAtLeast(usize),
}

impl Check {
    fn passes(self, raw: &str) -> bool {
        let value = raw.trim();
        match self {
            Self::Required => required(value),
            Self::Format(p) => matches_pattern(value, p),
            Self::FormatIgnoringCase(p) => matches_pattern(&value.to_ascii_uppercase(), p),
            Self::DigitsExactly(n) => {
                matches_pattern(value, Pattern::Digits) && length_exactly(value, n)
            }
            Self::DigitsAtLeast(n) => {
                matches_pattern(value, Pattern::Digits) && length_at_least(value, n)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Text {
        field: Field,
        check: Check,
        message: &'static str,
    },
    BusinessTypeChosen,
    ChannelVerified(Channel),
    FileAttached(FileSlot),
    ProductTypesSelected,
    /// Every selected product type has a license number and document.
    LicensesComplete,
    AccountNumbersMatch,
    /// No lookup outstanding and no lookup error, whatever the fields say.
    BankLookupSettled,
    TermsAccepted,
}

const fn text(field: Field, check: Check, message: &'static str) -> Rule {
    Rule::Text {
        field,
        check,
        message,
    }
}

const COMPANY_RULES: &[Rule] = &[
    text(Field::CompanyName, Check::Required, "Please enter the company name"),
    Rule::BusinessTypeChosen,
    text(
        Field::Gstin,
        Check::FormatIgnoringCase(Pattern::Gstin),
        "Please enter a valid 15-character GSTIN",
    ),
    text(Field::AddressLine, Check::Required, "Please enter the registered address"),
    text(Field::City, Check::Required, "Please enter the city"),
    text(Field::State, Check::Required, "Please enter the state"),
    text(Field::Pincode, Check::DigitsExactly(6), "Please enter a valid 6-digit PIN code"),
    text(
        Field::Phone,
        Check::DigitsExactly(10),
        "Please enter a valid 10-digit phone number",
    ),
];

const COORDINATOR_RULES: &[Rule] = &[
    text(Field::CoordinatorName, Check::Required, "Please enter the coordinator's name"),
    text(
        Field::CoordinatorDesignation,
        Check::Required,
        "Please enter the coordinator's designation",
    ),
    text(
        Field::CoordinatorEmail,
        Check::Format(Pattern::Email),
        "Please enter a valid email address",
    ),
    Rule::ChannelVerified(Channel::Email),
    text(
        Field::CoordinatorMobile,
        Check::DigitsExactly(10),
        "Please enter a valid 10-digit mobile number",
    ),
    Rule::ChannelVerified(Channel::Mobile),
];

const DOCUMENT_RULES: &[Rule] = &[
    Rule::FileAttached(FileSlot::GstCertificate),
    Rule::ProductTypesSelected,
    Rule::LicensesComplete,
];

const BANK_RULES: &[Rule] = &[
    text(Field::AccountHolder, Check::Required, "Please enter the account holder's name"),
    text(
        Field::AccountNumber,
        Check::DigitsAtLeast(MIN_ACCOUNT_DIGITS),
        "Please enter a valid account number (at least 9 digits)",
    ),
    Rule::AccountNumbersMatch,
    text(
        Field::Ifsc,
        Check::Format(Pattern::Ifsc),
        "Please enter a valid 11-character IFSC code",
    ),
    Rule::BankLookupSettled,
    text(Field::BankName, Check::Required, "Please enter the bank name"),
    text(Field::Branch, Check::Required, "Please enter the branch"),
    Rule::FileAttached(FileSlot::CancelledCheque),
];

const REVIEW_RULES: &[Rule] = &[Rule::TermsAccepted];

fn rules_for(step: WizardStep) -> &'static [Rule] {
    match step.number() {
        1 => COMPANY_RULES,
        2 => COORDINATOR_RULES,
        3 => DOCUMENT_RULES,
        4 => BANK_RULES,
        _ => REVIEW_RULES,
    }
}

// ─── Evaluation ──────────────────────────────────────────────────────

/// `(field to focus, message)` for a failed rule.
type Miss = (Option<&'static str>, String);

impl Rule {
    fn evaluate(self, record: &FormRecord, aux: &AuxState) -> Result<(), Miss> {
        match self {
            Self::Text {
                field,
                check,
                message,
            } => {
                if check.passes(record.text(field)) {
                    Ok(())
                } else {
                    Err((Some(field.as_str()), message.to_string()))
                }
            }
            Self::BusinessTypeChosen => record
                .company()
                .business_type
                .map(|_| ())
                .ok_or((Some("business_type"), "Please select a business type".to_string())),
            Self::ChannelVerified(channel) => {
                if aux.channel_verified(channel) {
                    Ok(())
                } else {
                    let (field, message) = match channel {
                        Channel::Email => (Field::CoordinatorEmail, "Please verify the email address"),
                        Channel::Mobile => (Field::CoordinatorMobile, "Please verify the mobile number"),
                    };
                    Err((Some(field.as_str()), message.to_string()))
                }
            }
            Self::FileAttached(slot) => {
                let (file, message) = match slot {
                    FileSlot::GstCertificate => (
                        &record.documents().gst_file,
                        "Please upload the GST certificate",
                    ),
                    FileSlot::CancelledCheque => (
                        &record.bank().cancelled_cheque_file,
                        "Please upload a cancelled cheque",
                    ),
                };
                if required(file) {
                    Ok(())
                } else {
                    Err((Some(slot.as_str()), message.to_string()))
                }
            }
            Self::ProductTypesSelected => {
                if required(&record.documents().product_types) {
                    Ok(())
                } else {
                    Err((
                        Some("product_types"),
                        "Please select at least one product type".to_string(),
                    ))
                }
            }
            Self::LicensesComplete => match first_incomplete_license(record) {
                None => Ok(()),
                Some(product_type) => Err((
                    Some("licenses"),
                    format!("Please provide the license number and document for {product_type}"),
                )),
            },
            Self::AccountNumbersMatch => {
                let bank = record.bank();
                if bank.account_number.trim() == bank.confirm_account_number.trim() {
                    Ok(())
                } else {
                    Err((
                        Some(Field::ConfirmAccountNumber.as_str()),
                        "Account numbers do not match".to_string(),
                    ))
                }
            }
            Self::BankLookupSettled => {
                if aux.bank_lookup_pending {
                    return Err((
                        Some(Field::Ifsc.as_str()),
                        "Please wait while bank details are fetched".to_string(),
                    ));
                }
                match &aux.bank_lookup_error {
                    Some(error) => Err((Some(Field::Ifsc.as_str()), error.clone())),
                    None => Ok(()),
                }
            }
            Self::TermsAccepted => {
                if record.terms_accepted() {
                    Ok(())
                } else {
                    Err((
                        Some("terms_accepted"),
                        "Please accept the terms and conditions".to_string(),
                    ))
                }
            }
        }
    }
}

/// Selected product types are iterated in label order, so the message
/// names the same category every time.
fn first_incomplete_license(record: &FormRecord) -> Option<&ProductType> {
    let documents = record.documents();
    documents.product_types.iter().find(|product_type| {
        !documents
            .licenses
            .get(*product_type)
            .is_some_and(|entry| entry.is_complete())
    })
}

/// Validate one step's slice of the record.
///
/// # Errors
///
/// Returns the first failing rule in declaration order.
pub fn validate_step(
    step: WizardStep,
    record: &FormRecord,
    aux: &AuxState,
) -> Result<(), ValidationFailure> {
    for rule in rules_for(step) {
        rule.evaluate(record, aux)
            .map_err(|(field, message)| ValidationFailure {
                step,
                field: field.map(str::to_string),
                message,
            })?;
    }
    Ok(())
}

/// Validate steps `1..=last` in order, stopping at the first failure.
pub fn validate_through(
    last: WizardStep,
    record: &FormRecord,
    aux: &AuxState,
) -> Result<(), ValidationFailure> {
    WizardStep::all()
        .take_while(|step| *step <= last)
        .try_for_each(|step| validate_step(step, record, aux))
}
