//! # Async Request Tickets
//!
//! Every outbound call (OTP send/verify, IFSC lookup, submission, review
//! decision) is dispatched as a ticket stamped with its owner's epoch at
//! dispatch time. The owner bumps its epoch whenever the user moves on
//! (step change, modal close, resend, a new IFSC), so a response that
//! arrives for an old epoch is reported as [`Completion::Stale`] and
//! changes nothing.
//!
//! While a ticket is outstanding the owner holds a request-in-flight
//! marker and refuses to dispatch a duplicate.

use serde::Serialize;

/// Result of handing a collaborator response back to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// The response was current and has been applied.
    Applied,
    /// The owner moved on since dispatch; the response was dropped.
    Stale,
}

impl Completion {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// A collaborator failed at the service level (transport error, 5xx,
/// timeout, or an explicit error body).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceFailure {
    /// User-facing text supplied by the collaborator, if any.
    pub message: Option<String>,
}

impl ServiceFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// A failure with no usable text.
    pub fn silent() -> Self {
        Self::default()
    }

    /// The collaborator's text verbatim, or `fallback` when it gave none.
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Fallback text when a collaborator fails without explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_or_prefers_collaborator_text() {
        assert_eq!(ServiceFailure::new("OTP quota exceeded").message_or("x"), "OTP quota exceeded");
        assert_eq!(ServiceFailure::silent().message_or("fallback"), "fallback");
        assert_eq!(ServiceFailure::new("   ").message_or("fallback"), "fallback");
    }
}
