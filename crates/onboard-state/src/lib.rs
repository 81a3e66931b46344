//! # onboard-state: Onboarding State Machines
//!
//! Pure, synchronous state for the seller-onboarding flow. Nothing here
//! performs I/O: operations that need an external collaborator hand back
//! a ticket, and the caller feeds the collaborator's answer to the
//! matching `complete_*` method.
//!
//! ## Modules
//!
//! - [`record`]: the [`FormRecord`] aggregate and its invariants.
//! - [`rules`]: per-step validation, first failure wins.
//! - [`wizard`]: the five-step [`WizardState`] and submission phase.
//! - [`otp`]: per-channel OTP verification with resend cooldown.
//! - [`bank`]: IFSC lookup tracking.
//! - [`ui`]: menus, the OTP modal and notices.
//! - [`session`]: [`OnboardingSession`], tying the above together.
//! - [`review`]: the admin [`ReviewChecklist`].
//! - [`catalog`]: [`ProductDraft`] validation.

pub mod bank;
pub mod catalog;
pub mod otp;
pub mod record;
pub mod review;
pub mod rules;
pub mod session;
pub mod ticket;
pub mod ui;
pub mod wizard;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod testing;

pub use bank::{BankLookupError, BankLookupState, BankLookupView, BankTicket, LookupStatus};
pub use catalog::{CatalogFailure, ProductDraft};
pub use otp::{
    OtpChannelState, OtpChannelView, OtpController, OtpError, OtpPhase, OtpRequest, OtpTicket,
    MISMATCH_MESSAGE, OTP_LENGTH, RESEND_COOLDOWN_TICKS,
};
pub use record::{Field, FieldEffect, FileSlot, FormRecord, RecordError};
pub use review::{ChecklistItem, ReviewChecklist, ReviewError, ReviewOutcome, ReviewPhase, ReviewTicket};
pub use rules::{validate_step, validate_through, AuxState, ValidationFailure};
pub use session::{OnboardingSession, SessionError, SessionView};
pub use ticket::{Completion, ServiceFailure, GENERIC_FAILURE_MESSAGE};
pub use ui::{Menu, Notice, NoticeKind, UiState};
pub use wizard::{
    Advance, SubmissionOutcome, SubmissionTicket, WizardPhase, WizardState, WizardStep, STEP_COUNT,
};
