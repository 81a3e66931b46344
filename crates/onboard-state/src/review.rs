//! # Admin Review Checklist
//!
//! A reviewer works through every uploaded document of a submitted
//! application, marking each one verified, then records a decision.
//!
//! - `Accept` is allowed only once every line item is verified.
//! - `Reject` and `Correction` need a comment for the seller.
//! - One decision may be in flight at a time. After the collaborator
//!   confirms it the checklist is closed.

use serde::Serialize;
use thiserror::Error;

use onboard_core::{FileHandle, ReviewDecision, SellerDetail};

use crate::ticket::{ServiceFailure, GENERIC_FAILURE_MESSAGE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub item_id: String,
    pub label: String,
    pub file: FileHandle,
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ReviewPhase {
    Open,
    Deciding { decision: ReviewDecision },
    Closed { decision: ReviewDecision },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTicket {
    epoch: u64,
    decision: ReviewDecision,
    comment: String,
}

impl ReviewTicket {
    pub fn decision(&self) -> ReviewDecision {
        self.decision
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("unknown checklist item: {0}")]
    UnknownItem(String),

    #[error("review already closed with decision {0}")]
    Closed(ReviewDecision),

    #[error("a {0} decision is already being recorded")]
    RequestInFlight(ReviewDecision),

    #[error("{} document(s) not yet verified: {}", pending.len(), pending.join(", "))]
    UnverifiedItems { pending: Vec<String> },

    #[error("a comment is required to {0}")]
    CommentRequired(ReviewDecision),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    Recorded(ReviewDecision),
    Failed(String),
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewChecklist {
    detail: SellerDetail,
    items: Vec<ChecklistItem>,
    #[serde(flatten)]
    phase: ReviewPhase,
    /// Message from the last failed decision.
    message: Option<String>,
    #[serde(skip)]
    epoch: u64,
}

impl ReviewChecklist {
    pub fn from_detail(detail: SellerDetail) -> Self {
        let items = detail
            .documents
            .iter()
            .map(|doc| ChecklistItem {
                item_id: doc.item_id.clone(),
                label: doc.label.clone(),
                file: doc.file.clone(),
                verified: false,
            })
            .collect();
        Self {
            detail,
            items,
            phase: ReviewPhase::Open,
            message: None,
            epoch: 0,
        }
    }

    pub fn detail(&self) -> &SellerDetail {
        &self.detail
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn phase(&self) -> ReviewPhase {
        self.phase
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn ensure_open(&self) -> Result<(), ReviewError> {
        match self.phase {
            ReviewPhase::Open => Ok(()),
            ReviewPhase::Deciding { decision } => Err(ReviewError::RequestInFlight(decision)),
            ReviewPhase::Closed { decision } => Err(ReviewError::Closed(decision)),
        }
    }

    pub fn mark(&mut self, item_id: &str, verified: bool) -> Result<(), ReviewError> {
        self.ensure_open()?;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.item_id == item_id)
            .ok_or_else(|| ReviewError::UnknownItem(item_id.to_string()))?;
        item.verified = verified;
        Ok(())
    }

    pub fn pending_items(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| !item.verified)
            .map(|item| item.item_id.clone())
            .collect()
    }

    pub fn can_accept(&self) -> bool {
        self.phase == ReviewPhase::Open && self.items.iter().all(|item| item.verified)
    }

    /// Dispatch a decision to the review collaborator.
    pub fn decide(
        &mut self,
        decision: ReviewDecision,
        comment: &str,
    ) -> Result<ReviewTicket, ReviewError> {
        self.ensure_open()?;
        let comment = comment.trim();
        match decision {
            ReviewDecision::Accept => {
                let pending = self.pending_items();
                if !pending.is_empty() {
                    return Err(ReviewError::UnverifiedItems { pending });
                }
            }
            ReviewDecision::Reject | ReviewDecision::Correction => {
                if comment.is_empty() {
                    return Err(ReviewError::CommentRequired(decision));
                }
            }
        }
        self.epoch += 1;
        self.phase = ReviewPhase::Deciding { decision };
        self.message = None;
        Ok(ReviewTicket {
            epoch: self.epoch,
            decision,
            comment: comment.to_string(),
        })
    }

    pub fn complete(
        &mut self,
        ticket: &ReviewTicket,
        result: Result<(), ServiceFailure>,
    ) -> ReviewOutcome {
        let current = matches!(self.phase, ReviewPhase::Deciding { decision } if decision == ticket.decision);
        if !current || ticket.epoch != self.epoch {
            return ReviewOutcome::Stale;
        }
        match result {
            Ok(()) => {
                self.phase = ReviewPhase::Closed {
                    decision: ticket.decision,
                };
                ReviewOutcome::Recorded(ticket.decision)
            }
            Err(failure) => {
                let message = failure.message_or(GENERIC_FAILURE_MESSAGE);
                self.phase = ReviewPhase::Open;
                self.message = Some(message.clone());
                ReviewOutcome::Failed(message)
            }
        }
    }
}
