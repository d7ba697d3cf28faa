//! Transport decoding for ticket text.
//!
//! Tickets travel in cookies and query strings, where `+` is unsafe. The
//! issuer therefore Base64-encodes the binary ticket, writes every `+` as
//! `!`, and URL-escapes the result. Decoding reverses those steps in order:
//! URL-decode, restore `+`, Base64-decode.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use percent_encoding::percent_decode;

use crate::error::{Result, TicketError};

/// Standard alphabet; cookies often lose their trailing `=` so padding is optional.
const TICKET_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded wire form of a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTicket(Vec<u8>);

impl RawTicket {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for RawTicket {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for RawTicket {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Decode ticket text as found in a cookie or request parameter.
pub fn decode_ticket(text: &str) -> Result<RawTicket> {
    let escaped = text.trim().as_bytes();
    check_escapes(escaped)?;

    let mut payload: Vec<u8> = percent_decode(escaped).collect();
    for byte in payload.iter_mut() {
        if *byte == b'!' {
            *byte = b'+';
        }
    }

    TICKET_BASE64
        .decode(&payload)
        .map(RawTicket)
        .map_err(|e| TicketError::Decode(format!("invalid base64: {e}")))
}

/// Reject `%` sequences that are not followed by two hex digits.
///
/// `percent_decode` passes such sequences through untouched, which would
/// let a mangled cookie reach the Base64 step with a misleading error.
fn check_escapes(escaped: &[u8]) -> Result<()> {
    for (offset, _) in escaped.iter().enumerate().filter(|(_, b)| **b == b'%') {
        let digits = escaped.get(offset + 1..offset + 3);
        let valid = digits.is_some_and(|d| d.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(TicketError::Decode(format!(
                "malformed percent escape at offset {offset}"
            )));
        }
    }
    Ok(())
}
