//! # API Route Modules
//!
//! - `sessions`: create and read wizard sessions, edit the record, navigate
//!   between steps. Editing the IFSC runs the bank lookup; passing the last
//!   step runs the submission.
//! - `otp`: the per-channel verification modal (open, send, digit entry,
//!   paste, resend, close).
//! - `admin`: the reviewer's document checklist and decision.
//! - `catalog`: product listings for an onboarded seller.

pub mod admin;
pub mod catalog;
pub mod otp;
pub mod sessions;
