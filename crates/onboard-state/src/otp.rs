//! # OTP Challenge Controller
//!
//! One state machine per verifiable channel (email, mobile):
//!
//! ```text
//!            send ok                 6th digit            match
//!   Idle ───────────▶ Sent ─────────────────▶ Verifying ─────────▶ Verified
//!                      ▲  ◀───── mismatch ─────┘    │
//!                      │                            │ service error
//!                      └────── resend / input ── Failed ◀┘
//! ```
//!
//! The controller never decides whether a code is correct. It hands the
//! code to the OTP collaborator in an [`OtpTicket`] and applies the verdict
//! when the ticket is completed. `Verified` is reachable only through a
//! collaborator-confirmed match, and once reached the channel refuses every
//! further send, input and reset.
//!
//! Resend eligibility is gated by a cooldown counted in ticks. Resending at
//! zero restarts the cooldown, clears the entered code and abandons any
//! verification still in flight.

use serde::Serialize;
use thiserror::Error;

use onboard_core::{matches_pattern, Channel, VerifyOutcome};

use crate::ticket::{Completion, ServiceFailure, GENERIC_FAILURE_MESSAGE};

/// Digits in every OTP.
pub const OTP_LENGTH: usize = 6;

/// Ticks (seconds) a channel must wait between sends.
pub const RESEND_COOLDOWN_TICKS: u32 = 30;

pub const MISMATCH_MESSAGE: &str = "Invalid OTP. Please try again.";

const SEND_FAILURE_MESSAGE: &str = "Could not send OTP. Please try again.";

/// Where a channel is in its verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPhase {
    Idle,
    Sent,
    Verifying,
    Verified,
    /// The collaborator failed while verifying. Input and resend remain open.
    Failed,
}

impl std::fmt::Display for OtpPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Sent => "sent",
            Self::Verifying => "verifying",
            Self::Verified => "verified",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The kind of request a channel has outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpRequest {
    Send,
    Resend,
    Verify,
}

/// A dispatched OTP request. Complete it with
/// [`OtpChannelState::complete_send`] or [`OtpChannelState::complete_verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpTicket {
    channel: Channel,
    kind: OtpRequest,
    epoch: u64,
    destination: String,
    code: Option<String>,
}

impl OtpTicket {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn kind(&self) -> OtpRequest {
        self.kind
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// The entered code, for verify tickets.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// Actions a channel refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("{channel} is already verified")]
    AlreadyVerified { channel: Channel },

    #[error("{channel} already has a {kind:?} request in flight")]
    RequestInFlight { channel: Channel, kind: OtpRequest },

    #[error("{message}")]
    InvalidDestination { channel: Channel, message: String },

    #[error("an OTP was already sent to the {channel} destination; use resend")]
    AlreadySent { channel: Channel },

    #[error("no OTP has been sent to the {channel} destination yet")]
    NotSent { channel: Channel },

    #[error("{channel} is not accepting code input while {phase}")]
    NotAcceptingInput { channel: Channel, phase: OtpPhase },

    #[error("OTP input must be digits, got {0:?}")]
    NotADigit(char),

    #[error("pasted text contains no digits")]
    NothingToPaste,
}

/// Read-only projection for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpChannelView {
    pub channel: Channel,
    pub phase: OtpPhase,
    pub destination: Option<String>,
    /// Digits entered so far.
    pub entered: String,
    pub cooldown_remaining: u32,
    pub can_resend: bool,
    pub in_flight: Option<OtpRequest>,
    pub message: Option<String>,
}

// ─── Channel ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChannelState {
    channel: Channel,
    phase: OtpPhase,
    /// Destination the last successful send went to.
    destination: Option<String>,
    code: String,
    cooldown: u32,
    epoch: u64,
    in_flight: Option<OtpRequest>,
    message: Option<String>,
}

impl OtpChannelState {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            phase: OtpPhase::Idle,
            destination: None,
            code: String::new(),
            cooldown: 0,
            epoch: 0,
            in_flight: None,
            message: None,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn phase(&self) -> OtpPhase {
        self.phase
    }

    pub fn is_verified(&self) -> bool {
        self.phase == OtpPhase::Verified
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn entered(&self) -> &str {
        &self.code
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn in_flight(&self) -> Option<OtpRequest> {
        self.in_flight
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn ensure_open(&self) -> Result<(), OtpError> {
        if self.is_verified() {
            return Err(OtpError::AlreadyVerified {
                channel: self.channel,
            });
        }
        if let Some(kind) = self.in_flight {
            return Err(OtpError::RequestInFlight {
                channel: self.channel,
                kind,
            });
        }
        Ok(())
    }

    fn ticket(&self, kind: OtpRequest, destination: String, code: Option<String>) -> OtpTicket {
        OtpTicket {
            channel: self.channel,
            kind,
            epoch: self.epoch,
            destination,
            code,
        }
    }

    fn is_current(&self, ticket: &OtpTicket) -> bool {
        ticket.channel == self.channel
            && ticket.epoch == self.epoch
            && self.in_flight == Some(ticket.kind)
    }

    /// Ask for the first code to be sent to `destination`.
    ///
    /// A malformed destination leaves the channel `Idle` with a message.
    pub fn request_send(&mut self, destination: &str) -> Result<OtpTicket, OtpError> {
        self.ensure_open()?;
        if self.phase != OtpPhase::Idle {
            return Err(OtpError::AlreadySent {
                channel: self.channel,
            });
        }
        let destination = destination.trim();
        if !matches_pattern(destination, self.channel.destination_pattern()) {
            let message = self.channel.invalid_destination_message().to_string();
            self.message = Some(message.clone());
            return Err(OtpError::InvalidDestination {
                channel: self.channel,
                message,
            });
        }
        self.in_flight = Some(OtpRequest::Send);
        self.message = None;
        Ok(self.ticket(OtpRequest::Send, destination.to_string(), None))
    }

    /// Apply the collaborator's answer to a send or resend.
    pub fn complete_send(
        &mut self,
        ticket: &OtpTicket,
        result: Result<(), ServiceFailure>,
    ) -> Completion {
        if ticket.kind == OtpRequest::Verify || !self.is_current(ticket) {
            return Completion::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(()) => {
                if self.phase == OtpPhase::Idle {
                    self.cooldown = RESEND_COOLDOWN_TICKS;
                }
                self.phase = OtpPhase::Sent;
                self.destination = Some(ticket.destination.clone());
                self.code.clear();
                self.message = None;
            }
            Err(failure) => {
                if ticket.kind == OtpRequest::Resend {
                    // Nothing was delivered; let the user try again at once.
                    self.cooldown = 0;
                }
                self.message = Some(failure.message_or(SEND_FAILURE_MESSAGE));
            }
        }
        Completion::Applied
    }

    fn ensure_accepting_input(&self) -> Result<(), OtpError> {
        self.ensure_open()?;
        match self.phase {
            OtpPhase::Sent | OtpPhase::Failed => Ok(()),
            phase => Err(OtpError::NotAcceptingInput {
                channel: self.channel,
                phase,
            }),
        }
    }

    /// Dispatch verification for the full code.
    fn submit_code(&mut self) -> OtpTicket {
        self.phase = OtpPhase::Verifying;
        self.in_flight = Some(OtpRequest::Verify);
        self.message = None;
        let destination = self.destination.clone().unwrap_or_default();
        self.ticket(OtpRequest::Verify, destination, Some(self.code.clone()))
    }

    /// Enter one digit. The sixth digit submits the code.
    pub fn input_digit(&mut self, digit: char) -> Result<Option<OtpTicket>, OtpError> {
        self.ensure_accepting_input()?;
        if !digit.is_ascii_digit() {
            return Err(OtpError::NotADigit(digit));
        }
        self.phase = OtpPhase::Sent;
        self.message = None;
        self.code.push(digit);
        if self.code.len() == OTP_LENGTH {
            return Ok(Some(self.submit_code()));
        }
        Ok(None)
    }

    pub fn backspace(&mut self) -> Result<(), OtpError> {
        self.ensure_accepting_input()?;
        self.code.pop();
        Ok(())
    }

    /// Replace the entered code with the digits of `text`. A full-length
    /// paste submits the code.
    pub fn paste(&mut self, text: &str) -> Result<Option<OtpTicket>, OtpError> {
        self.ensure_accepting_input()?;
        let digits: String = text
            .chars()
            .filter(char::is_ascii_digit)
            .take(OTP_LENGTH)
            .collect();
        if digits.is_empty() {
            return Err(OtpError::NothingToPaste);
        }
        self.phase = OtpPhase::Sent;
        self.message = None;
        self.code = digits;
        if self.code.len() == OTP_LENGTH {
            return Ok(Some(self.submit_code()));
        }
        Ok(None)
    }

    /// Apply the collaborator's verdict on a submitted code.
    pub fn complete_verify(
        &mut self,
        ticket: &OtpTicket,
        result: Result<VerifyOutcome, ServiceFailure>,
    ) -> Completion {
        if ticket.kind != OtpRequest::Verify || !self.is_current(ticket) {
            return Completion::Stale;
        }
        self.in_flight = None;
        self.code.clear();
        match result {
            Ok(VerifyOutcome::Verified) => {
                self.phase = OtpPhase::Verified;
                self.cooldown = 0;
                self.message = None;
            }
            Ok(VerifyOutcome::Mismatch) => {
                self.phase = OtpPhase::Sent;
                self.message = Some(MISMATCH_MESSAGE.to_string());
            }
            Err(failure) => {
                self.phase = OtpPhase::Failed;
                self.message = Some(failure.message_or(GENERIC_FAILURE_MESSAGE));
            }
        }
        Completion::Applied
    }

    /// Request a fresh code.
    ///
    /// Returns `Ok(None)` without touching anything while the cooldown is
    /// running.
    pub fn request_resend(&mut self) -> Result<Option<OtpTicket>, OtpError> {
        if self.is_verified() {
            return Err(OtpError::AlreadyVerified {
                channel: self.channel,
            });
        }
        let Some(destination) = self.destination.clone() else {
            return Err(OtpError::NotSent {
                channel: self.channel,
            });
        };
        if let Some(kind @ (OtpRequest::Send | OtpRequest::Resend)) = self.in_flight {
            return Err(OtpError::RequestInFlight {
                channel: self.channel,
                kind,
            });
        }
        if self.cooldown > 0 {
            return Ok(None);
        }
        // Abandons an outstanding verify.
        self.epoch += 1;
        self.cooldown = RESEND_COOLDOWN_TICKS;
        self.code.clear();
        self.phase = OtpPhase::Sent;
        self.in_flight = Some(OtpRequest::Resend);
        self.message = None;
        Ok(Some(self.ticket(OtpRequest::Resend, destination, None)))
    }

    /// Let `ticks` seconds pass on the cooldown.
    pub fn advance_clock(&mut self, ticks: u32) {
        self.cooldown = self.cooldown.saturating_sub(ticks);
    }

    pub fn tick(&mut self) {
        self.advance_clock(1);
    }

    /// Drop any outstanding request. A code being verified goes back to
    /// editable input.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
        if self.phase == OtpPhase::Verifying {
            self.phase = OtpPhase::Sent;
            self.code.clear();
        }
    }

    /// Forget everything about this channel, e.g. after its destination
    /// was edited.
    pub fn reset(&mut self) -> Result<(), OtpError> {
        if self.is_verified() {
            return Err(OtpError::AlreadyVerified {
                channel: self.channel,
            });
        }
        let epoch = self.epoch + 1;
        *self = Self::new(self.channel);
        self.epoch = epoch;
        Ok(())
    }

    pub fn view(&self) -> OtpChannelView {
        OtpChannelView {
            channel: self.channel,
            phase: self.phase,
            destination: self.destination.clone(),
            entered: self.code.clone(),
            cooldown_remaining: self.cooldown,
            can_resend: !self.is_verified()
                && self.destination.is_some()
                && self.cooldown == 0
                && !matches!(self.in_flight, Some(OtpRequest::Send | OtpRequest::Resend)),
            in_flight: self.in_flight,
            message: self.message.clone(),
        }
    }
}

// ─── Controller ──────────────────────────────────────────────────────

/// Both channels of one onboarding session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpController {
    email: OtpChannelState,
    mobile: OtpChannelState,
}

impl Default for OtpController {
    fn default() -> Self {
        Self::new()
    }
}

impl OtpController {
    pub fn new() -> Self {
        Self {
            email: OtpChannelState::new(Channel::Email),
            mobile: OtpChannelState::new(Channel::Mobile),
        }
    }

    pub fn channel(&self, channel: Channel) -> &OtpChannelState {
        match channel {
            Channel::Email => &self.email,
            Channel::Mobile => &self.mobile,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut OtpChannelState {
        match channel {
            Channel::Email => &mut self.email,
            Channel::Mobile => &mut self.mobile,
        }
    }

    pub fn is_verified(&self, channel: Channel) -> bool {
        self.channel(channel).is_verified()
    }

    pub fn advance_clock(&mut self, ticks: u32) {
        self.email.advance_clock(ticks);
        self.mobile.advance_clock(ticks);
    }

    pub fn views(&self) -> Vec<OtpChannelView> {
        vec![self.email.view(), self.mobile.view()]
    }
}
