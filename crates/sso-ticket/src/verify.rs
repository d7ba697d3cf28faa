//! End-to-end ticket verification.
//!
//! decode -> parse -> canonical bytes -> signature -> validity window.
//! The first failing stage rejects the ticket; there is no partial success.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::canonical::canonical_bytes;
use crate::error::{Result, TicketError};
use crate::signature::{verify_signature, TrustAnchor};
use crate::ticket::{parse_ticket, ParsedTicket};
use crate::transport::decode_ticket;

/// Verify decoded ticket bytes and return the parsed ticket on success.
pub fn verify_ticket(raw: &[u8], anchor: &TrustAnchor, now: DateTime<Utc>) -> Result<ParsedTicket> {
    let result = run_pipeline(raw, anchor, now);
    if let Err(e) = &result {
        warn!(error = %e, "ticket rejected");
    }
    result
}

/// Verify ticket text as it arrives in a cookie or request parameter.
pub fn verify_ticket_text(
    text: &str,
    anchor: &TrustAnchor,
    now: DateTime<Utc>,
) -> Result<ParsedTicket> {
    let raw = decode_ticket(text).inspect_err(|e| warn!(error = %e, "ticket rejected"))?;
    verify_ticket(raw.as_bytes(), anchor, now)
}

fn run_pipeline(raw: &[u8], anchor: &TrustAnchor, now: DateTime<Utc>) -> Result<ParsedTicket> {
    let ticket = parse_ticket(raw)?;
    let signature = ticket
        .signature()
        .ok_or(TicketError::MissingField("signature"))?;

    let canonical = canonical_bytes(&ticket);
    debug!(
        canonical_len = canonical.len(),
        signature_len = signature.len(),
        "verifying ticket signature"
    );
    verify_signature(&canonical, signature, anchor)?;

    ticket.validity.check(now)?;
    debug!(
        start = %ticket.validity.start,
        end = %ticket.validity.end,
        "ticket accepted"
    );
    Ok(ticket)
}

/// Holds a trust anchor so request handlers only parse the certificate once.
#[derive(Debug, Clone)]
pub struct TicketVerifier {
    anchor: TrustAnchor,
}

impl TicketVerifier {
    pub fn new(anchor: TrustAnchor) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> &TrustAnchor {
        &self.anchor
    }

    pub fn verify(&self, raw: &[u8], now: DateTime<Utc>) -> Result<ParsedTicket> {
        verify_ticket(raw, &self.anchor, now)
    }

    pub fn verify_text(&self, text: &str, now: DateTime<Utc>) -> Result<ParsedTicket> {
        verify_ticket_text(text, &self.anchor, now)
    }

    /// Verify against the wall clock.
    pub fn verify_now(&self, text: &str) -> Result<ParsedTicket> {
        self.verify_text(text, Utc::now())
    }
}
