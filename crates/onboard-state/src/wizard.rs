//! # Wizard State Machine
//!
//! Five linear steps with gated forward movement:
//!
//! ```text
//! Company ──▶ Coordinator ──▶ Documents ──▶ Bank ──▶ Review ──▶ (submit)
//!    ◀────────────── back / jump to any reached step ──────────────
//! ```
//!
//! - `advance` validates the current step and moves forward by one. On the
//!   last step it validates every step and dispatches the submission.
//! - `retreat` moves back by one without validation, floor step 1.
//! - `jump_to(t)` is allowed iff `t == 1` or `t <= highest_reached`
//!   ([`WizardState::can_jump_to`]). Its return value says whether the
//!   step moved, so an allowed jump to the current step returns `false`.
//!
//! Submission moves the machine through `Submitting` to `Submitted`. While
//! submitting, and for good after submission, navigation is a no-op and
//! `advance` reports the phase instead of re-validating.
//!
//! `current <= highest_reached` holds after every call, and
//! `highest_reached` never decreases.

use serde::{Deserialize, Serialize};

use onboard_core::{SubmissionReceipt, ValidationError};

use crate::record::FormRecord;
use crate::rules::{validate_step, validate_through, AuxState, ValidationFailure};

/// Number of wizard steps.
pub const STEP_COUNT: u8 = 5;

// ─── Steps ───────────────────────────────────────────────────────────

/// A wizard step index in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WizardStep(u8);

impl WizardStep {
    pub const COMPANY: Self = Self(1);
    pub const COORDINATOR: Self = Self(2);
    pub const DOCUMENTS: Self = Self(3);
    pub const BANK: Self = Self(4);
    pub const REVIEW: Self = Self(5);

    pub const FIRST: Self = Self::COMPANY;
    pub const LAST: Self = Self::REVIEW;

    /// # Errors
    ///
    /// Returns [`ValidationError::StepOutOfRange`] outside `1..=5`.
    pub fn new(number: u8) -> Result<Self, ValidationError> {
        if (1..=STEP_COUNT).contains(&number) {
            Ok(Self(number))
        } else {
            Err(ValidationError::StepOutOfRange(number))
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn title(&self) -> &'static str {
        match self.0 {
            1 => "Company",
            2 => "Coordinator",
            3 => "Documents",
            4 => "Bank",
            _ => "Review",
        }
    }

    pub fn is_last(&self) -> bool {
        *self == Self::LAST
    }

    pub fn next(&self) -> Option<Self> {
        Self::new(self.0 + 1).ok()
    }

    pub fn prev(&self) -> Option<Self> {
        self.0.checked_sub(1).and_then(|n| Self::new(n).ok())
    }

    /// All steps in order.
    pub fn all() -> impl Iterator<Item = WizardStep> {
        (1..=STEP_COUNT).map(Self)
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = ValidationError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.0
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.0, self.title())
    }
}

// ─── Phase & results ─────────────────────────────────────────────────

/// Whether the wizard is collecting input or handing it off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WizardPhase {
    Editing,
    Submitting,
    /// Terminal. The record can no longer change.
    Submitted { receipt: SubmissionReceipt },
}

/// Claim on the single in-flight submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    epoch: u64,
}

/// What a successful `advance` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { from: WizardStep, to: WizardStep },
    /// Last step passed; the record should now go to the submission
    /// collaborator.
    SubmissionDispatched(SubmissionTicket),
    /// Already submitted; nothing happened.
    AlreadySubmitted,
    /// A submission is outstanding; nothing happened.
    SubmissionInFlight,
}

/// What a submission response did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Submitted(SubmissionReceipt),
    /// The wizard stays on the last step with this message.
    Failed(String),
    Stale,
}

// ─── Machine ─────────────────────────────────────────────────────────

/// Step position and submission phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardState {
    current: WizardStep,
    highest_reached: WizardStep,
    #[serde(flatten)]
    phase: WizardPhase,
    #[serde(skip)]
    epoch: u64,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            current: WizardStep::FIRST,
            highest_reached: WizardStep::FIRST,
            phase: WizardPhase::Editing,
            epoch: 0,
        }
    }

    pub fn current(&self) -> WizardStep {
        self.current
    }

    pub fn highest_reached(&self) -> WizardStep {
        self.highest_reached
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, WizardPhase::Submitted { .. })
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, WizardPhase::Submitting)
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        match &self.phase {
            WizardPhase::Submitted { receipt } => Some(receipt),
            _ => None,
        }
    }

    fn navigation_locked(&self) -> bool {
        !matches!(self.phase, WizardPhase::Editing)
    }

    /// Validate the current step and move forward, or dispatch the
    /// submission from the last step.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule. State is unchanged on error.
    pub fn advance(
        &mut self,
        record: &FormRecord,
        aux: &AuxState,
    ) -> Result<Advance, ValidationFailure> {
        match self.phase {
            WizardPhase::Submitted { .. } => return Ok(Advance::AlreadySubmitted),
            WizardPhase::Submitting => return Ok(Advance::SubmissionInFlight),
            WizardPhase::Editing => {}
        }

        let from = self.current;
        match from.next() {
            Some(to) => {
                validate_step(from, record, aux)?;
                self.current = to;
                self.highest_reached = self.highest_reached.max(to);
                Ok(Advance::Moved { from, to })
            }
            None => {
                // Earlier steps may have been edited after a backward jump.
                validate_through(WizardStep::LAST, record, aux)?;
                self.epoch += 1;
                self.phase = WizardPhase::Submitting;
                Ok(Advance::SubmissionDispatched(SubmissionTicket { epoch: self.epoch }))
            }
        }
    }

    /// Step back by one. Returns whether the step changed.
    pub fn retreat(&mut self) -> bool {
        if self.navigation_locked() {
            return false;
        }
        match self.current.prev() {
            Some(prev) => {
                self.current = prev;
                true
            }
            None => false,
        }
    }

    /// Whether `target` is reachable by a jump: step 1 or any step reached
    /// before. Says nothing about the submission lock.
    pub fn can_jump_to(&self, target: WizardStep) -> bool {
        target == WizardStep::FIRST || target <= self.highest_reached
    }

    /// Jump to a previously reached step. Returns whether the step changed,
    /// not whether the jump was allowed: jumping to the current step is
    /// allowed but leaves everything as it was and returns `false`.
    pub fn jump_to(&mut self, target: WizardStep) -> bool {
        if self.navigation_locked() || !self.can_jump_to(target) || target == self.current {
            return false;
        }
        self.current = target;
        true
    }

    /// Apply the submission collaborator's answer.
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<SubmissionReceipt, String>,
    ) -> SubmissionOutcome {
        if !self.is_submitting() || ticket.epoch != self.epoch {
            return SubmissionOutcome::Stale;
        }
        match result {
            Ok(receipt) => {
                self.phase = WizardPhase::Submitted {
                    receipt: receipt.clone(),
                };
                SubmissionOutcome::Submitted(receipt)
            }
            Err(message) => {
                self.phase = WizardPhase::Editing;
                SubmissionOutcome::Failed(message)
            }
        }
    }
}
