//! Reconstruction of the signed byte sequence.
//!
//! The issuer signs the header and every info unit except the signature
//! itself. Units are replayed from their retained wire bytes rather than
//! re-encoded, so a tampered length field cannot be normalised away.

use crate::fields::SIGNATURE_TAG;
use crate::record::{InfoUnit, RecordStream};
use crate::ticket::ParsedTicket;

fn assemble(version: u8, code_page: &[u8; 4], units: &[InfoUnit]) -> Vec<u8> {
    let body_len: usize = units
        .iter()
        .filter(|u| u.tag != SIGNATURE_TAG)
        .map(|u| u.raw.len())
        .sum();
    let mut out = Vec::with_capacity(1 + code_page.len() + body_len);
    out.push(version);
    out.extend_from_slice(code_page);
    for unit in units.iter().filter(|u| u.tag != SIGNATURE_TAG) {
        out.extend_from_slice(&unit.raw);
    }
    out
}

/// Bytes the issuer signed: the ticket without its signature unit.
pub fn canonical_bytes(ticket: &ParsedTicket) -> Vec<u8> {
    assemble(ticket.version, &ticket.code_page, &ticket.units)
}

/// Same as [`canonical_bytes`] for a stream that has only been framed.
pub fn canonical_from_records(stream: &RecordStream) -> Vec<u8> {
    assemble(stream.version, &stream.code_page, &stream.units)
}
