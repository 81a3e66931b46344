//! # onboard CLI entry point

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use onboard_cli::ifsc::{run_ifsc, IfscArgs};
use onboard_cli::validate::{run_validate, ValidateArgs};

/// Seller onboarding tools.
#[derive(Parser, Debug)]
#[command(name = "onboard", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the wizard's step rules over a saved record.
    Validate(ValidateArgs),

    /// Check or resolve an IFSC.
    Ifsc(IfscArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Ifsc(args) => run_ifsc(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_cli::ifsc::IfscCommand;

    #[test]
    fn parse_validate_with_flags() {
        let cli = Cli::try_parse_from([
            "onboard",
            "validate",
            "record.json",
            "--step",
            "3",
            "--email-verified",
        ])
        .unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.step, Some(3));
        assert!(args.email_verified);
        assert!(!args.mobile_verified);
    }

    #[test]
    fn parse_ifsc_lookup() {
        let cli = Cli::try_parse_from(["onboard", "ifsc", "lookup", "SBIN0001234"]).unwrap();
        let Commands::Ifsc(args) = cli.command else {
            panic!("expected ifsc");
        };
        assert!(matches!(args.command, IfscCommand::Lookup { ref code } if code == "SBIN0001234"));
    }

    #[test]
    fn validate_requires_a_path() {
        assert!(Cli::try_parse_from(["onboard", "validate"]).is_err());
    }
}
