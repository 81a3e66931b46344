//! # IFSC Subcommand
//!
//! ```bash
//! onboard ifsc check SBIN0001234
//! onboard ifsc lookup SBIN0001234
//! ```
//!
//! `check` runs the format rule only. `lookup` also asks the bank
//! directory, configured from `ONBOARD_*` environment variables.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use onboard_client::{OnboardApiConfig, OnboardClient};
use onboard_core::Ifsc;

#[derive(Args, Debug)]
pub struct IfscArgs {
    #[command(subcommand)]
    pub command: IfscCommand,
}

#[derive(Subcommand, Debug)]
pub enum IfscCommand {
    /// Check the code's format offline.
    Check {
        /// The IFSC, e.g. SBIN0001234.
        code: String,
    },

    /// Resolve the code to bank, branch, state and district.
    Lookup {
        /// The IFSC, e.g. SBIN0001234.
        code: String,
    },
}

pub fn run_ifsc(args: &IfscArgs) -> Result<u8> {
    match &args.command {
        IfscCommand::Check { code } => Ok(run_check(code)),
        IfscCommand::Lookup { code } => run_lookup(code),
    }
}

fn run_check(code: &str) -> u8 {
    match Ifsc::new(code) {
        Ok(ifsc) => {
            println!("{ifsc}: valid");
            0
        }
        Err(e) => {
            println!("{}: {e}", code.trim());
            1
        }
    }
}

fn run_lookup(code: &str) -> Result<u8> {
    let ifsc = match Ifsc::new(code) {
        Ok(ifsc) => ifsc,
        Err(e) => {
            println!("{}: {e}", code.trim());
            return Ok(1);
        }
    };
    let config = OnboardApiConfig::from_env().context("bank directory is not configured")?;
    let client = OnboardClient::new(config).context("failed to build the HTTP client")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let details = runtime
        .block_on(client.bank().lookup(&ifsc))
        .with_context(|| format!("lookup of {ifsc} failed"))?;

    match details {
        Some(details) => {
            println!("{}", serde_json::to_string_pretty(&details)?);
            Ok(0)
        }
        None => {
            println!("{ifsc}: not found");
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_normalises_and_accepts() {
        assert_eq!(run_check(" sbin0001234 "), 0);
    }

    #[test]
    fn check_rejects_malformed() {
        assert_eq!(run_check("SBIN1001234"), 1);
        assert_eq!(run_check("SBI0001234"), 1);
    }

    #[test]
    fn lookup_of_malformed_code_fails_before_configuration() {
        assert_eq!(run_lookup("nope").unwrap(), 1);
    }
}
