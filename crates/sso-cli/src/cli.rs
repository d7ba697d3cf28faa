//! CLI command definitions and argument parsing

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sso_ticket::{canonical_bytes, decode_ticket, parse_ticket, TicketError, TicketVerifier, TrustAnchor};
use tracing::{debug, info};

use crate::config::{CliOverrides, Config, TrustConfig};
use crate::output::{OutputFormat, OutputFormatter, TicketReport};
use crate::ExitCode;

/// SSO Ticket CLI - SAP logon ticket inspection and verification
#[derive(Parser, Debug)]
#[command(name = "sso-ticket")]
#[command(version, about = "Inspect and verify SAP logon tickets (MYSAPSSO2)")]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: table, json, quiet (defaults to the config file value)
    #[arg(long, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Debug mode (pipeline-level tracing)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file path
    #[arg(long, global = true, env = "SSO_TICKET_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode and list the fields of a ticket without verifying it
    Inspect(TicketArgs),
    /// Verify signature and validity window against the issuer certificate
    Verify(VerifyArgs),
    /// Print the bytes covered by the signature, hex encoded
    Canonical(TicketArgs),
}

/// Ticket input shared by all commands
#[derive(Parser, Debug)]
pub struct TicketArgs {
    /// Ticket text, `@path` to read it from a file, or `-` for stdin
    pub ticket: String,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub input: TicketArgs,

    /// Issuer certificate file (DER, PEM or base64 DER)
    #[arg(long, conflicts_with = "cert_base64")]
    pub cert: Option<PathBuf>,

    /// Issuer certificate as base64 DER
    #[arg(long)]
    pub cert_base64: Option<String>,

    /// Evaluate the validity window at this RFC 3339 instant instead of now
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,
}

impl Cli {
    /// CLI overrides for the configuration file
    pub fn overrides(&self) -> CliOverrides {
        let (certificate_path, certificate_base64) = match &self.command {
            Commands::Verify(args) => (args.cert.clone(), args.cert_base64.clone()),
            _ => (None, None),
        };
        CliOverrides {
            output_format: self.output.map(|f| f.to_string()),
            debug: if self.debug { Some(true) } else { None },
            certificate_path,
            certificate_base64,
        }
    }

    /// Execute the CLI command with a resolved configuration
    pub fn execute_with_config(self, config: Config) -> anyhow::Result<ExitCode> {
        let format: OutputFormat = config
            .output
            .format
            .parse()
            .map_err(anyhow::Error::msg)?;
        let formatter = OutputFormatter::new(format, self.verbose);

        match self.command {
            Commands::Inspect(args) => args.inspect(&formatter),
            Commands::Verify(args) => args.execute(&formatter, &config.trust),
            Commands::Canonical(args) => args.canonical(&formatter),
        }
    }
}

impl TicketArgs {
    fn inspect(self, formatter: &OutputFormatter) -> anyhow::Result<ExitCode> {
        let text = read_ticket_arg(&self.ticket)?;
        let parsed = decode_ticket(&text).and_then(|raw| parse_ticket(raw.as_bytes()));
        let ticket = match parsed {
            Ok(ticket) => ticket,
            Err(e) => return Ok(report_failure(formatter, &e, "inspect")),
        };

        let report = TicketReport::from_ticket(&ticket, Utc::now());
        emit(&formatter.format_ticket(&report, "inspect"));
        Ok(ExitCode::Success)
    }

    fn canonical(self, formatter: &OutputFormatter) -> anyhow::Result<ExitCode> {
        let text = read_ticket_arg(&self.ticket)?;
        let parsed = decode_ticket(&text).and_then(|raw| parse_ticket(raw.as_bytes()));
        let ticket = match parsed {
            Ok(ticket) => ticket,
            Err(e) => return Ok(report_failure(formatter, &e, "canonical")),
        };

        let canonical = canonical_bytes(&ticket);
        debug!(canonical_len = canonical.len(), "canonical bytes assembled");
        emit(&formatter.format_canonical(&canonical));
        Ok(ExitCode::Success)
    }
}

impl VerifyArgs {
    fn execute(self, formatter: &OutputFormatter, trust: &TrustConfig) -> anyhow::Result<ExitCode> {
        let anchor = match load_anchor(trust) {
            Ok(anchor) => anchor,
            Err(e) => return Ok(report_failure(formatter, &e, "verify")),
        };
        debug!(subject = %anchor.subject(), serial = %anchor.serial_hex(), "trust certificate loaded");

        let text = read_ticket_arg(&self.input.ticket)?;
        let now = self.at.unwrap_or_else(Utc::now);
        formatter.progress(&format!("verifying at {}", now.to_rfc3339()));

        let verifier = TicketVerifier::new(anchor);
        match verifier.verify_text(&text, now) {
            Ok(ticket) => {
                info!(user = ?ticket.user(), "ticket verified");
                let report = TicketReport::from_ticket(&ticket, now).verified_by(verifier.anchor());
                emit(&formatter.format_ticket(&report, "verify"));
                Ok(ExitCode::Success)
            }
            Err(e) => Ok(report_failure(formatter, &e, "verify")),
        }
    }
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

/// Resolve the ticket argument: literal text, `@path`, or `-` for stdin.
pub fn read_ticket_arg(arg: &str) -> anyhow::Result<String> {
    if arg == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read ticket from stdin")?;
        Ok(text)
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read ticket file {path}"))
    } else {
        Ok(arg.to_string())
    }
}

/// Build the trust anchor from configuration.
///
/// Inline base64 wins over a file; a file may hold DER, PEM or base64 DER.
pub fn load_anchor(trust: &TrustConfig) -> Result<TrustAnchor, TicketError> {
    if let Some(ref encoded) = trust.certificate_base64 {
        return TrustAnchor::from_base64(encoded);
    }
    match trust.certificate_path {
        Some(ref path) => anchor_from_file(path),
        None => Err(TicketError::Configuration(
            "no trust certificate: pass --cert or --cert-base64, or set [trust] in the config file"
                .to_string(),
        )),
    }
}

fn anchor_from_file(path: &Path) -> Result<TrustAnchor, TicketError> {
    let bytes = std::fs::read(path).map_err(|e| {
        TicketError::Configuration(format!("cannot read {}: {e}", path.display()))
    })?;

    // DER certificates open with a SEQUENCE tag.
    if bytes.first() == Some(&0x30) {
        return TrustAnchor::from_der(&bytes);
    }
    let text = std::str::from_utf8(&bytes).map_err(|_| {
        TicketError::Configuration(format!("{} is neither DER nor text", path.display()))
    })?;
    let body: String = text
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();
    TrustAnchor::from_base64(&body)
}

fn report_failure(formatter: &OutputFormatter, err: &TicketError, command: &str) -> ExitCode {
    let code = ExitCode::from(err);
    let message = formatter.format_error_with_code(err, code, command);
    match formatter.format() {
        OutputFormat::Json => println!("{message}"),
        OutputFormat::Table => eprintln!("{message}"),
        OutputFormat::Quiet => {}
    }
    code
}

fn emit(output: &str) {
    if !output.is_empty() {
        println!("{output}");
    }
}
