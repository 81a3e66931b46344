//! # Error Types: Structured Error Hierarchy
//!
//! All errors use `thiserror`. Validation errors carry the rejected input
//! so logs show exactly what was refused; transition errors carry the
//! current state and the attempted action.

use thiserror::Error;

/// Top-level error type for the onboarding workspace.
#[derive(Error, Debug)]
pub enum OnboardError {
    /// A newtype constructor rejected its input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A state machine refused an action in its current state.
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    /// An external collaborator failed or answered unexpectedly.
    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Rejected input for a validated newtype.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid IFSC code: \"{0}\" (expected 4 letters, '0', then 6 letters or digits)")]
    InvalidIfsc(String),

    #[error("invalid GSTIN: \"{0}\" (expected 15-character GST identification number)")]
    InvalidGstin(String),

    #[error("invalid phone number: \"{0}\" (expected 10 digits)")]
    InvalidPhone(String),

    #[error("invalid PIN code: \"{0}\" (expected 6 digits)")]
    InvalidPincode(String),

    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),

    /// Product-type labels must be non-empty and at most 64 characters.
    #[error("invalid product type label: \"{0}\" (must be non-empty, at most 64 characters)")]
    InvalidProductType(String),

    #[error("{kind} must be non-empty")]
    EmptyIdentifier {
        /// Which identifier was empty.
        kind: &'static str,
    },

    #[error("unknown {kind}: \"{value}\"")]
    Unknown {
        /// What was being parsed (field, channel, business type...).
        kind: &'static str,
        /// The unrecognised input.
        value: String,
    },

    #[error("wizard step {0} is out of range (1..=5)")]
    StepOutOfRange(u8),
}
