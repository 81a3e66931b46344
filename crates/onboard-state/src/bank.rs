//! # IFSC Lookup Tracking
//!
//! A complete IFSC triggers a lookup against the bank directory. The
//! result replaces the four bank fields of the record wholesale. A newer
//! code, a truncated code or step navigation makes any outstanding lookup
//! stale.

use serde::Serialize;
use thiserror::Error;

use onboard_core::{BankDetails, Ifsc};

use crate::record::FormRecord;
use crate::ticket::{Completion, ServiceFailure};

pub const NOT_FOUND_MESSAGE: &str = "Invalid IFSC code. Please check and try again.";

const LOOKUP_FAILURE_MESSAGE: &str = "Could not fetch bank details. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Idle,
    Pending,
    Resolved,
    NotFound,
    Failed,
}

/// A dispatched lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankTicket {
    epoch: u64,
    ifsc: Ifsc,
}

impl BankTicket {
    pub fn ifsc(&self) -> &Ifsc {
        &self.ifsc
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankLookupError {
    #[error("lookup for {ifsc} is already in flight")]
    RequestInFlight { ifsc: Ifsc },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankLookupView {
    pub status: LookupStatus,
    pub ifsc: Option<Ifsc>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankLookupState {
    epoch: u64,
    status: LookupStatus,
    /// Code of the outstanding or last completed lookup.
    ifsc: Option<Ifsc>,
    error: Option<String>,
}

impl Default for BankLookupState {
    fn default() -> Self {
        Self::new()
    }
}

impl BankLookupState {
    pub fn new() -> Self {
        Self {
            epoch: 0,
            status: LookupStatus::Idle,
            ifsc: None,
            error: None,
        }
    }

    pub fn status(&self) -> LookupStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == LookupStatus::Pending
    }

    /// Message from a lookup that found nothing or failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether `ifsc` already has a definite answer.
    pub fn settled_for(&self, ifsc: &Ifsc) -> bool {
        matches!(self.status, LookupStatus::Resolved | LookupStatus::NotFound)
            && self.ifsc.as_ref() == Some(ifsc)
    }

    /// Start a lookup for `ifsc`, superseding any other outstanding one.
    ///
    /// # Errors
    ///
    /// [`BankLookupError::RequestInFlight`] when the same code is already
    /// being looked up.
    pub fn begin(&mut self, ifsc: Ifsc) -> Result<BankTicket, BankLookupError> {
        if self.is_pending() && self.ifsc.as_ref() == Some(&ifsc) {
            return Err(BankLookupError::RequestInFlight { ifsc });
        }
        self.epoch += 1;
        self.status = LookupStatus::Pending;
        self.ifsc = Some(ifsc.clone());
        self.error = None;
        Ok(BankTicket {
            epoch: self.epoch,
            ifsc,
        })
    }

    /// Apply the directory's answer. `Ok(None)` means the code is unknown.
    pub fn complete(
        &mut self,
        ticket: &BankTicket,
        result: Result<Option<BankDetails>, ServiceFailure>,
        record: &mut FormRecord,
    ) -> Completion {
        if !self.is_pending() || ticket.epoch != self.epoch {
            return Completion::Stale;
        }
        match result {
            Ok(Some(details)) => {
                record.apply_bank_details(details);
                self.status = LookupStatus::Resolved;
                self.error = None;
            }
            Ok(None) => {
                record.clear_bank_details();
                self.status = LookupStatus::NotFound;
                self.error = Some(NOT_FOUND_MESSAGE.to_string());
            }
            Err(failure) => {
                record.clear_bank_details();
                self.status = LookupStatus::Failed;
                self.error = Some(failure.message_or(LOOKUP_FAILURE_MESSAGE));
            }
        }
        Completion::Applied
    }

    /// The code is no longer complete; forget the last lookup.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.status = LookupStatus::Idle;
        self.ifsc = None;
        self.error = None;
    }

    /// Abandon an outstanding lookup. Completed results are kept.
    pub fn invalidate(&mut self) {
        if self.is_pending() {
            self.epoch += 1;
            self.status = LookupStatus::Idle;
        }
    }

    pub fn view(&self) -> BankLookupView {
        BankLookupView {
            status: self.status,
            ifsc: self.ifsc.clone(),
            message: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;
    use crate::testing::sbi_details;

    fn ifsc(code: &str) -> Ifsc {
        Ifsc::new(code).unwrap()
    }

    #[test]
    fn resolved_lookup_fills_record() {
        let mut record = FormRecord::new();
        let mut bank = BankLookupState::new();
        let ticket = bank.begin(ifsc("SBIN0005943")).unwrap();
        assert!(bank.is_pending());
        assert_eq!(bank.complete(&ticket, Ok(Some(sbi_details())), &mut record), Completion::Applied);
        assert_eq!(bank.status(), LookupStatus::Resolved);
        assert_eq!(record.bank().details(), sbi_details());
    }

    #[test]
    fn unknown_code_sets_not_found_message() {
        let mut record = FormRecord::new();
        record.set_text(Field::BankName, "stale");
        let mut bank = BankLookupState::new();
        let ticket = bank.begin(ifsc("ABCD0123456")).unwrap();
        bank.complete(&ticket, Ok(None), &mut record);
        assert_eq!(bank.status(), LookupStatus::NotFound);
        assert_eq!(bank.error(), Some(NOT_FOUND_MESSAGE));
        assert_eq!(record.text(Field::BankName), "");
    }

    #[test]
    fn service_failure_uses_collaborator_text() {
        let mut record = FormRecord::new();
        let mut bank = BankLookupState::new();
        let ticket = bank.begin(ifsc("SBIN0005943")).unwrap();
        bank.complete(&ticket, Err(ServiceFailure::new("Directory offline")), &mut record);
        assert_eq!(bank.status(), LookupStatus::Failed);
        assert_eq!(bank.error(), Some("Directory offline"));
    }

    #[test]
    fn duplicate_lookup_is_refused() {
        let mut bank = BankLookupState::new();
        bank.begin(ifsc("SBIN0005943")).unwrap();
        assert!(matches!(
            bank.begin(ifsc("SBIN0005943")),
            Err(BankLookupError::RequestInFlight { .. })
        ));
    }

    #[test]
    fn newer_code_supersedes_older_lookup() {
        let mut record = FormRecord::new();
        let mut bank = BankLookupState::new();
        let old = bank.begin(ifsc("SBIN0005943")).unwrap();
        let new = bank.begin(ifsc("HDFC0000001")).unwrap();
        assert!(bank.complete(&old, Ok(Some(sbi_details())), &mut record).is_stale());
        assert_eq!(record.text(Field::BankName), "");
        assert_eq!(bank.complete(&new, Ok(None), &mut record), Completion::Applied);
    }

    #[test]
    fn invalidate_drops_outstanding_lookup_only() {
        let mut record = FormRecord::new();
        let mut bank = BankLookupState::new();
        let ticket = bank.begin(ifsc("SBIN0005943")).unwrap();
        bank.invalidate();
        assert_eq!(bank.status(), LookupStatus::Idle);
        assert!(bank.complete(&ticket, Ok(Some(sbi_details())), &mut record).is_stale());

        let ticket = bank.begin(ifsc("SBIN0005943")).unwrap();
        bank.complete(&ticket, Ok(None), &mut record);
        bank.invalidate();
        assert_eq!(bank.status(), LookupStatus::NotFound, "completed result kept");
    }

    #[test]
    fn reset_clears_error() {
        let mut record = FormRecord::new();
        let mut bank = BankLookupState::new();
        let ticket = bank.begin(ifsc("ABCD0123456")).unwrap();
        bank.complete(&ticket, Ok(None), &mut record);
        bank.reset();
        assert_eq!(bank.view(), BankLookupView { status: LookupStatus::Idle, ifsc: None, message: None });
    }
}
