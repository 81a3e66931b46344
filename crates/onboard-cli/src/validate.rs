//! # Validate Subcommand
//!
//! ```bash
//! onboard validate record.json
//! onboard validate record.json --step 4 --email-verified --mobile-verified
//! ```
//!
//! Reads a [`FormRecord`] as JSON and reports the first failure of each
//! step. Exits 1 if any step fails.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use onboard_state::{validate_step, AuxState, FormRecord, ValidationFailure, WizardStep};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the record JSON.
    pub record: PathBuf,

    /// Only check this step (1 to 5).
    #[arg(long)]
    pub step: Option<u8>,

    /// Treat the coordinator email as OTP-verified.
    #[arg(long)]
    pub email_verified: bool,

    /// Treat the coordinator mobile as OTP-verified.
    #[arg(long)]
    pub mobile_verified: bool,
}

/// Outcome for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: WizardStep,
    pub failure: Option<ValidationFailure>,
}

pub fn load_record(path: &Path) -> Result<FormRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a valid record", path.display()))
}

/// Check `steps` in order. Every step is checked even after a failure.
pub fn check_steps(
    record: &FormRecord,
    aux: &AuxState,
    steps: impl IntoIterator<Item = WizardStep>,
) -> Vec<StepReport> {
    steps
        .into_iter()
        .map(|step| StepReport {
            step,
            failure: validate_step(step, record, aux).err(),
        })
        .collect()
}

pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let record = load_record(&args.record)?;
    let aux = AuxState {
        email_verified: args.email_verified,
        mobile_verified: args.mobile_verified,
        bank_lookup_pending: false,
        bank_lookup_error: None,
    };
    let steps: Vec<WizardStep> = match args.step {
        Some(n) => vec![WizardStep::new(n)?],
        None => WizardStep::all().collect(),
    };

    let reports = check_steps(&record, &aux, steps);
    for report in &reports {
        match &report.failure {
            None => println!("  ok    {}", report.step),
            Some(failure) => match &failure.field {
                Some(field) => println!("  FAIL  {}  {field}: {}", report.step, failure.message),
                None => println!("  FAIL  {}  {}", report.step, failure.message),
            },
        }
    }

    let failed = reports.iter().filter(|r| r.failure.is_some()).count();
    tracing::debug!(checked = reports.len(), failed, "validation finished");
    Ok(u8::from(failed > 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_state::testing::{complete_aux, complete_record};
    use std::io::Write;

    fn write_record(record: &FormRecord) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(record).unwrap().as_bytes())
            .unwrap();
        file
    }

    #[test]
    fn complete_record_passes_every_step() {
        let reports = check_steps(&complete_record(), &complete_aux(), WizardStep::all());
        assert_eq!(reports.len(), 5);
        assert!(reports.iter().all(|r| r.failure.is_none()));
    }

    #[test]
    fn unverified_contacts_fail_only_coordinator_step() {
        let reports = check_steps(&complete_record(), &AuxState::default(), WizardStep::all());
        let failed: Vec<u8> = reports
            .iter()
            .filter(|r| r.failure.is_some())
            .map(|r| r.step.number())
            .collect();
        assert!(failed.contains(&2));
        assert!(!failed.contains(&1));
    }

    #[test]
    fn run_validate_exit_codes() {
        let file = write_record(&complete_record());
        let verified = ValidateArgs {
            record: file.path().to_path_buf(),
            step: None,
            email_verified: true,
            mobile_verified: true,
        };
        assert_eq!(run_validate(&verified).unwrap(), 0);

        let unverified = ValidateArgs {
            email_verified: false,
            ..verified
        };
        assert_eq!(run_validate(&unverified).unwrap(), 1);
    }

    #[test]
    fn single_step_and_range_check() {
        let file = write_record(&FormRecord::default());
        let args = ValidateArgs {
            record: file.path().to_path_buf(),
            step: Some(1),
            email_verified: false,
            mobile_verified: false,
        };
        assert_eq!(run_validate(&args).unwrap(), 1);

        let out_of_range = ValidateArgs { step: Some(6), ..args };
        assert!(run_validate(&out_of_range).is_err());
    }

    #[test]
    fn unreadable_record_is_an_error() {
        let args = ValidateArgs {
            record: PathBuf::from("/nonexistent/record.json"),
            step: None,
            email_verified: false,
            mobile_verified: false,
        };
        assert!(run_validate(&args).is_err());
    }
}
