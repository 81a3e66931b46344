//! # onboard-core: Foundational Types for Seller Onboarding
//!
//! Leaf crate of the onboarding workspace. Defines the primitives every
//! other crate builds on:
//!
//! - **Field validators** (`validators.rs`): pure boolean predicates over raw
//!   input. Presence, format patterns, and length bounds. Validators never
//!   carry human-readable messages; those belong to the step rules that
//!   call them.
//!
//! - **Validated newtypes** (`identity.rs`): `Ifsc`, `Gstin`, `Phone`,
//!   `Pincode`, `Email`, `ProductType`, plus session and application
//!   identifiers. String newtypes validate at construction.
//!
//! - **Domain DTOs** (`domain.rs`): the sections of a seller application,
//!   file handles, bank details, review decisions, and the payloads exchanged
//!   with external collaborators.
//!
//! - **Errors** (`error.rs`): `OnboardError` at the top, with
//!   `ValidationError` for rejected newtype input.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `onboard-*` crates.
//! - No I/O.
//! - No `.unwrap()` outside tests.

pub mod domain;
pub mod error;
pub mod identity;
pub mod validators;

pub use domain::{
    BankAccount, BankDetails, BusinessType, Channel, CompanyDetails, CoordinatorDetails,
    DocumentRef, DocumentSet, FileHandle, LicenseEntry, NewProduct, ReviewDecision,
    SellerApplication, SellerDetail, SubmissionReceipt, VerifyOutcome,
};
pub use error::{OnboardError, ValidationError};
pub use identity::{ApplicationId, Email, Gstin, Ifsc, Phone, Pincode, ProductType, SessionId};
pub use validators::{length_at_least, length_exactly, matches_pattern, required, Pattern, Presence};
