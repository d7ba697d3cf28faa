//! Output formatting for CLI results
//!
//! Three output formats are supported:
//! - Table: Human-readable tables (default)
//! - JSON: Structured JSON for scripting and automation
//! - Quiet: Minimal output, exit codes only

use std::str::FromStr;

use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use sso_ticket::fields::SIGNATURE_TAG;
use sso_ticket::{FieldKey, ParsedTicket, TrustAnchor};

use crate::ExitCode;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for scripting
    Json,
    /// Minimal output - exit codes only
    Quiet,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Quiet => write!(f, "quiet"),
        }
    }
}

/// Standard JSON response wrapper for consistent schema
#[derive(Serialize)]
pub struct JsonResponse<T: Serialize> {
    /// Whether the operation was successful
    pub success: bool,
    /// The response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// ISO 8601 timestamp
    pub timestamp: String,
    /// Command that was executed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl<T: Serialize> JsonResponse<T> {
    /// Create a successful response with command context
    pub fn success_with_command(data: T, command: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
            command: Some(command.to_string()),
        }
    }
}

impl JsonResponse<()> {
    /// Create an error response with command context
    pub fn error_with_command(message: &str, command: &str) -> JsonResponse<()> {
        JsonResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: Utc::now().to_rfc3339(),
            command: Some(command.to_string()),
        }
    }
}

/// One projected field of a ticket
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldReport {
    pub tag: u8,
    pub name: String,
    /// Decoded text, absent for binary fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub hex: String,
    pub length: usize,
}

/// Everything the CLI reports about a parsed ticket
#[derive(Debug, Clone, Serialize)]
pub struct TicketReport {
    pub version: u8,
    pub code_page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub valid_from: String,
    pub valid_until: String,
    /// Whether the validity window contains the evaluation time
    pub valid_now: bool,
    pub signed: bool,
    pub fields: Vec<FieldReport>,
    /// Whether the signature and validity window were checked
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl TicketReport {
    pub fn from_ticket(ticket: &ParsedTicket, now: DateTime<Utc>) -> Self {
        let fields = ticket
            .fields
            .iter()
            .filter(|(key, _)| key.tag() != SIGNATURE_TAG)
            .map(|(key, value)| field_report(ticket, *key, value))
            .collect();

        Self {
            version: ticket.version,
            code_page: ticket.code_page_str(),
            user: ticket.user(),
            valid_from: ticket.validity.start.to_rfc3339(),
            valid_until: ticket.validity.end.to_rfc3339(),
            valid_now: ticket.validity.contains(now),
            signed: ticket.signature().is_some(),
            fields,
            verified: false,
            issuer: None,
        }
    }

    /// Mark the report as verified against `anchor`.
    pub fn verified_by(mut self, anchor: &TrustAnchor) -> Self {
        self.verified = true;
        self.issuer = Some(anchor.subject());
        self
    }
}

fn field_report(ticket: &ParsedTicket, key: FieldKey, value: &[u8]) -> FieldReport {
    let text = match key {
        FieldKey::Known(name) if !name.is_binary() => ticket.text(name),
        FieldKey::Known(_) => None,
        // Unknown tags are shown as text only when they happen to be valid UTF-8.
        FieldKey::Unknown(_) => std::str::from_utf8(value).ok().map(str::to_string),
    };
    FieldReport {
        tag: key.tag(),
        name: key.to_string(),
        text,
        hex: hex::encode(value),
        length: value.len(),
    }
}

#[derive(Serialize)]
struct CanonicalOutput {
    length: usize,
    hex: String,
}

/// Formats output for different modes
pub struct OutputFormatter {
    format: OutputFormat,
    verbose: bool,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Get the current output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a ticket report
    pub fn format_ticket(&self, report: &TicketReport, command: &str) -> String {
        match self.format {
            OutputFormat::Table => self.ticket_table(report),
            OutputFormat::Json => self.to_json_response(report, command),
            OutputFormat::Quiet => String::new(),
        }
    }

    /// Format canonical signed bytes
    pub fn format_canonical(&self, canonical: &[u8]) -> String {
        match self.format {
            OutputFormat::Table => hex::encode(canonical),
            OutputFormat::Json => self.to_json_response(
                &CanonicalOutput {
                    length: canonical.len(),
                    hex: hex::encode(canonical),
                },
                "canonical",
            ),
            OutputFormat::Quiet => String::new(),
        }
    }

    /// Format error with exit code context
    pub fn format_error_with_code(
        &self,
        error: &dyn std::error::Error,
        code: ExitCode,
        command: &str,
    ) -> String {
        match self.format {
            OutputFormat::Table => format!("Error: {error}"),
            OutputFormat::Json => {
                let response = JsonResponse::error_with_command(&error.to_string(), command);
                let mut output = match serde_json::to_value(&response) {
                    Ok(value) => value,
                    Err(e) => return format!("{{\"error\": \"{e}\"}}"),
                };
                output["exit_code"] = serde_json::json!(code as i32);
                output["exit_code_name"] = serde_json::json!(code.name());
                self.to_json(&output)
            }
            OutputFormat::Quiet => String::new(),
        }
    }

    /// Progress message (only shown in verbose mode)
    pub fn progress(&self, message: &str) {
        if self.verbose && self.format == OutputFormat::Table {
            eprintln!("... {message}");
        }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    fn to_json_response<T: Serialize>(&self, value: &T, command: &str) -> String {
        self.to_json(&JsonResponse::success_with_command(value, command))
    }

    fn ticket_table(&self, report: &TicketReport) -> String {
        let mut summary = Table::new();
        summary.load_preset(UTF8_FULL);
        summary.set_header(vec!["Property", "Value"]);
        summary.add_row(vec!["Version", &report.version.to_string()]);
        summary.add_row(vec!["Code Page", &report.code_page]);
        summary.add_row(vec!["User", report.user.as_deref().unwrap_or("-")]);
        summary.add_row(vec!["Valid From", &format_time(&report.valid_from)]);
        summary.add_row(vec!["Valid Until", &format_time(&report.valid_until)]);
        summary.add_row(vec!["Valid Now", if report.valid_now { "yes" } else { "no" }]);
        summary.add_row(vec!["Signed", if report.signed { "yes" } else { "no" }]);
        summary.add_row(vec!["Verified", if report.verified { "yes" } else { "no" }]);
        if let Some(ref issuer) = report.issuer {
            summary.add_row(vec!["Issuer", issuer]);
        }

        let mut fields = Table::new();
        fields.load_preset(UTF8_FULL);
        fields.set_header(vec!["Tag", "Field", "Length", "Value"]);
        for field in &report.fields {
            let value = match (&field.text, self.verbose) {
                (Some(text), false) => text.clone(),
                (Some(text), true) => format!("{text}\n{}", field.hex),
                (None, _) => field.hex.clone(),
            };
            fields.add_row(vec![
                field.tag.to_string(),
                field.name.clone(),
                field.length.to_string(),
                value,
            ]);
        }

        format!("{summary}\n{fields}")
    }
}

fn format_time(rfc3339: &str) -> String {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|_| rfc3339.to_string())
}
