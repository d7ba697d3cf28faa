//! SSO Ticket CLI
//!
//! Command-line tooling around the `sso-ticket` engine:
//! - Inspecting the fields of a ticket without verifying it
//! - Verifying a ticket against an issuer certificate
//! - Dumping the canonical signed bytes for signature debugging

pub mod cli;
pub mod config;
pub mod output;

pub use cli::Cli;
pub use config::{CliOverrides, Config};
pub use output::{OutputFormat, OutputFormatter};

use sso_ticket::TicketError;

/// Exit codes for CLI operations
///
/// - 0: Success - ticket inspected or verified
/// - 1: General error - unspecified error occurred
/// - 2: Signature rejected - the issuer certificate did not verify the ticket
/// - 3: Not valid - the ticket is outside its validity window
/// - 4: Invalid input - the ticket could not be decoded or parsed
/// - 5: Configuration error - no usable trust certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    SignatureRejected = 2,
    NotValid = 3,
    InvalidInput = 4,
    ConfigurationError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&TicketError> for ExitCode {
    fn from(err: &TicketError) -> Self {
        match err {
            TicketError::SignatureInvalid { .. } => ExitCode::SignatureRejected,
            TicketError::NotYetValid { .. } | TicketError::Expired { .. } => ExitCode::NotValid,
            TicketError::Configuration(_) => ExitCode::ConfigurationError,
            TicketError::TicketAbsent { .. } => ExitCode::InvalidInput,
            e if e.is_malformed() => ExitCode::InvalidInput,
            _ => ExitCode::GeneralError,
        }
    }
}

impl ExitCode {
    /// Convert to process exit code
    pub fn to_exit_code(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self as u8)
    }

    /// Get the exit code name as a string
    pub fn name(&self) -> &'static str {
        match self {
            ExitCode::Success => "SUCCESS",
            ExitCode::GeneralError => "GENERAL_ERROR",
            ExitCode::SignatureRejected => "SIGNATURE_REJECTED",
            ExitCode::NotValid => "NOT_VALID",
            ExitCode::InvalidInput => "INVALID_INPUT",
            ExitCode::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }
}
