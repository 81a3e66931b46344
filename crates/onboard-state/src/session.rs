//! # Onboarding Session
//!
//! One seller's onboarding attempt: the record, the wizard, both OTP
//! channels, the IFSC lookup and the UI state, kept consistent with each
//! other.
//!
//! Methods that need a collaborator return a ticket instead of calling
//! out. The caller performs the request and hands the answer back through
//! the matching `complete_*` method, which drops it if the session moved
//! on in the meantime.
//!
//! Cross-component rules enforced here:
//!
//! - Nothing in the record changes while a submission is outstanding or
//!   after it succeeded.
//! - A verified contact field cannot be edited. Editing an unverified one
//!   resets that channel.
//! - Changing step abandons any pending lookup, closes menus and closes
//!   the OTP modal (abandoning that channel's request).

use serde::Serialize;
use thiserror::Error;

use onboard_core::{
    BankDetails, BusinessType, Channel, FileHandle, ProductType, SubmissionReceipt, VerifyOutcome,
};

use crate::bank::{BankLookupError, BankLookupState, BankLookupView, BankTicket};
use crate::otp::{OtpChannelView, OtpController, OtpError, OtpTicket};
use crate::record::{Field, FieldEffect, FileSlot, FormRecord, RecordError};
use crate::rules::{AuxState, ValidationFailure};
use crate::ticket::{Completion, ServiceFailure, GENERIC_FAILURE_MESSAGE};
use crate::ui::{Menu, NoticeKind, UiState};
use crate::wizard::{Advance, SubmissionOutcome, SubmissionTicket, WizardState, WizardStep};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("the application has already been submitted")]
    Submitted,

    #[error("the application is being submitted")]
    SubmissionInProgress,

    #[error("the {0} address is verified and can no longer be changed")]
    ChannelLocked(Channel),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Bank(#[from] BankLookupError),
}

/// Everything a client needs to render the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub wizard: WizardState,
    /// Steps the seller may jump to.
    pub reachable_steps: Vec<WizardStep>,
    pub record: FormRecord,
    pub otp: Vec<OtpChannelView>,
    pub bank_lookup: BankLookupView,
    pub ui: UiState,
}

fn contact_channel(field: Field) -> Option<Channel> {
    match field {
        Field::CoordinatorEmail => Some(Channel::Email),
        Field::CoordinatorMobile => Some(Channel::Mobile),
        _ => None,
    }
}

fn contact_field(channel: Channel) -> Field {
    match channel {
        Channel::Email => Field::CoordinatorEmail,
        Channel::Mobile => Field::CoordinatorMobile,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingSession {
    record: FormRecord,
    wizard: WizardState,
    otp: OtpController,
    bank: BankLookupState,
    ui: UiState,
}

impl OnboardingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    pub fn otp(&self) -> &OtpController {
        &self.otp
    }

    pub fn bank(&self) -> &BankLookupState {
        &self.bank
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Rule inputs that live outside the record.
    pub fn aux(&self) -> AuxState {
        AuxState {
            email_verified: self.otp.is_verified(Channel::Email),
            mobile_verified: self.otp.is_verified(Channel::Mobile),
            bank_lookup_pending: self.bank.is_pending(),
            bank_lookup_error: self.bank.error().map(str::to_string),
        }
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.wizard.is_submitted() {
            Err(SessionError::Submitted)
        } else if self.wizard.is_submitting() {
            Err(SessionError::SubmissionInProgress)
        } else {
            Ok(())
        }
    }

    // ─── Record setters ──────────────────────────────────────────────

    /// Write a text field. Returns a lookup ticket when the IFSC became
    /// complete and has no answer yet.
    pub fn set_text(
        &mut self,
        field: Field,
        value: impl Into<String>,
    ) -> Result<Option<BankTicket>, SessionError> {
        self.ensure_editable()?;
        let value = value.into();

        if let Some(channel) = contact_channel(field) {
            if self.record.text(field) != value {
                if self.otp.is_verified(channel) {
                    return Err(SessionError::ChannelLocked(channel));
                }
                self.otp.channel_mut(channel).reset()?;
                if self.ui.otp_modal == Some(channel) {
                    self.ui.close_otp();
                }
            }
        }

        match self.record.set_text(field, value) {
            FieldEffect::Stored => Ok(None),
            FieldEffect::BankCleared => {
                self.bank.reset();
                Ok(None)
            }
            FieldEffect::LookupDue(code) => {
                if self.bank.settled_for(&code) {
                    return Ok(None);
                }
                match self.bank.begin(code) {
                    Ok(ticket) => Ok(Some(ticket)),
                    Err(BankLookupError::RequestInFlight { .. }) => Ok(None),
                }
            }
        }
    }

    pub fn set_business_type(&mut self, business_type: Option<BusinessType>) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.record.set_business_type(business_type);
        self.ui.close_menus();
        Ok(())
    }

    /// Returns whether the product type is selected afterwards.
    pub fn toggle_product_type(&mut self, product_type: ProductType) -> Result<bool, SessionError> {
        self.ensure_editable()?;
        Ok(self.record.toggle_product_type(product_type))
    }

    pub fn set_license_number(
        &mut self,
        product_type: &ProductType,
        number: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        Ok(self.record.set_license_number(product_type, number)?)
    }

    pub fn set_license_file(
        &mut self,
        product_type: &ProductType,
        file: Option<FileHandle>,
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        Ok(self.record.set_license_file(product_type, file)?)
    }

    pub fn set_file(&mut self, slot: FileSlot, file: Option<FileHandle>) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.record.set_file(slot, file);
        Ok(())
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.record.set_terms_accepted(accepted);
        Ok(())
    }

    pub fn toggle_menu(&mut self, menu: Menu) {
        self.ui.toggle_menu(menu);
    }

    // ─── Navigation ──────────────────────────────────────────────────

    /// The "Continue" button. A failure is also posted as the notice.
    pub fn continue_step(&mut self) -> Result<Advance, ValidationFailure> {
        self.ui.clear_notice();
        let aux = self.aux();
        match self.wizard.advance(&self.record, &aux) {
            Ok(advance) => {
                match &advance {
                    Advance::Moved { .. } => self.on_step_change(),
                    Advance::SubmissionDispatched(_) => {
                        self.ui.close_menus();
                        self.ui.notify(NoticeKind::Info, "Submitting your application");
                    }
                    Advance::AlreadySubmitted | Advance::SubmissionInFlight => {}
                }
                Ok(advance)
            }
            Err(failure) => {
                self.ui.notify(NoticeKind::Error, failure.message.clone());
                Err(failure)
            }
        }
    }

    pub fn back(&mut self) -> bool {
        let moved = self.wizard.retreat();
        if moved {
            self.on_step_change();
        }
        moved
    }

    pub fn jump_to(&mut self, step: WizardStep) -> bool {
        let moved = self.wizard.jump_to(step);
        if moved {
            self.on_step_change();
        }
        moved
    }

    fn on_step_change(&mut self) {
        self.bank.invalidate();
        self.ui.close_menus();
        self.ui.clear_notice();
        if let Some(channel) = self.ui.close_otp() {
            self.otp.channel_mut(channel).invalidate();
        }
    }

    // ─── OTP ─────────────────────────────────────────────────────────

    /// Show the OTP modal for `channel`. A modal open for the other
    /// channel is closed and its request abandoned.
    pub fn otp_open(&mut self, channel: Channel) -> Result<(), SessionError> {
        self.ensure_editable()?;
        if self.otp.is_verified(channel) {
            return Err(OtpError::AlreadyVerified { channel }.into());
        }
        if let Some(replaced) = self.ui.open_otp(channel) {
            self.otp.channel_mut(replaced).invalidate();
        }
        Ok(())
    }

    /// Close the modal and abandon the channel's outstanding request.
    pub fn otp_close(&mut self, channel: Channel) {
        if self.ui.otp_modal == Some(channel) {
            self.ui.close_otp();
            self.otp.channel_mut(channel).invalidate();
        }
    }

    /// Send the first code to the destination currently in the record.
    pub fn otp_send(&mut self, channel: Channel) -> Result<OtpTicket, SessionError> {
        self.otp_open(channel)?;
        let destination = self.record.text(contact_field(channel)).to_string();
        Ok(self.otp.channel_mut(channel).request_send(&destination)?)
    }

    pub fn otp_input(&mut self, channel: Channel, digit: char) -> Result<Option<OtpTicket>, SessionError> {
        self.ensure_editable()?;
        Ok(self.otp.channel_mut(channel).input_digit(digit)?)
    }

    pub fn otp_paste(&mut self, channel: Channel, text: &str) -> Result<Option<OtpTicket>, SessionError> {
        self.ensure_editable()?;
        Ok(self.otp.channel_mut(channel).paste(text)?)
    }

    pub fn otp_backspace(&mut self, channel: Channel) -> Result<(), SessionError> {
        self.ensure_editable()?;
        Ok(self.otp.channel_mut(channel).backspace()?)
    }

    /// `Ok(None)` while the cooldown is running.
    pub fn otp_resend(&mut self, channel: Channel) -> Result<Option<OtpTicket>, SessionError> {
        self.ensure_editable()?;
        Ok(self.otp.channel_mut(channel).request_resend()?)
    }

    pub fn complete_otp_send(
        &mut self,
        ticket: &OtpTicket,
        result: Result<(), ServiceFailure>,
    ) -> Completion {
        self.otp.channel_mut(ticket.channel()).complete_send(ticket, result)
    }

    pub fn complete_otp_verify(
        &mut self,
        ticket: &OtpTicket,
        result: Result<VerifyOutcome, ServiceFailure>,
    ) -> Completion {
        let channel = ticket.channel();
        let completion = self.otp.channel_mut(channel).complete_verify(ticket, result);
        if completion == Completion::Applied && self.otp.is_verified(channel) {
            if self.ui.otp_modal == Some(channel) {
                self.ui.close_otp();
            }
            let what = match channel {
                Channel::Email => "Email address",
                Channel::Mobile => "Mobile number",
            };
            self.ui.notify(NoticeKind::Success, format!("{what} verified"));
        }
        completion
    }

    /// Let `ticks` seconds pass on the OTP cooldowns.
    pub fn advance_clock(&mut self, ticks: u32) {
        self.otp.advance_clock(ticks);
    }

    // ─── Bank lookup & submission ────────────────────────────────────

    pub fn complete_bank_lookup(
        &mut self,
        ticket: &BankTicket,
        result: Result<Option<BankDetails>, ServiceFailure>,
    ) -> Completion {
        if self.ensure_editable().is_err() {
            return Completion::Stale;
        }
        self.bank.complete(ticket, result, &mut self.record)
    }

    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<SubmissionReceipt, ServiceFailure>,
    ) -> SubmissionOutcome {
        let result = result.map_err(|failure| failure.message_or(GENERIC_FAILURE_MESSAGE));
        let outcome = self.wizard.complete_submission(ticket, result);
        match &outcome {
            SubmissionOutcome::Submitted(receipt) => self.ui.notify(
                NoticeKind::Success,
                format!(
                    "Application submitted. Your reference number is {}",
                    receipt.application_id
                ),
            ),
            SubmissionOutcome::Failed(message) => self.ui.notify(NoticeKind::Error, message.clone()),
            SubmissionOutcome::Stale => {}
        }
        outcome
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            wizard: self.wizard.clone(),
            reachable_steps: WizardStep::all()
                .filter(|step| self.wizard.can_jump_to(*step))
                .collect(),
            record: self.record.clone(),
            otp: self.otp.views(),
            bank_lookup: self.bank.view(),
            ui: self.ui.clone(),
        }
    }
}
