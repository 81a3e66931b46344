//! # onboard-cli: Seller Onboarding Command-Line Tools
//!
//! ## Subcommands
//!
//! - `validate`: run the wizard's step rules over a saved record
//! - `ifsc`: check an IFSC offline or resolve it through the bank directory
//!
//! Handlers return the process exit code; argument parsing stays in
//! `main.rs`.

pub mod ifsc;
pub mod validate;
