//! Ticket error types.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, TicketError>;

/// Every way a ticket can be rejected.
///
/// All variants are terminal: the verification call stops at the first
/// failure and the caller is expected to reject the ticket.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("ticket decoding failed: {0}")]
    Decode(String),

    #[error("truncated ticket: expected {0}")]
    Truncated(Truncation),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("certificate verification failed: {reason}")]
    SignatureInvalid { reason: String },

    #[error("ticket not valid until {start}")]
    NotYetValid { start: DateTime<Utc> },

    #[error("ticket expired at {end}")]
    Expired { end: DateTime<Utc> },

    #[error("no {name} ticket in request")]
    TicketAbsent { name: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// The part of the binary stream that ran out of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    Version,
    CodePage,
    /// First byte of an info unit length.
    LengthHigh,
    /// Second byte of an info unit length.
    LengthLow,
    Content { expected: usize, available: usize },
}

impl fmt::Display for Truncation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version => write!(f, "version"),
            Self::CodePage => write!(f, "4-byte code page"),
            Self::LengthHigh => write!(f, "info unit length byte 1"),
            Self::LengthLow => write!(f, "info unit length byte 2"),
            Self::Content {
                expected,
                available,
            } => write!(
                f,
                "info unit content of expected length {expected} but got {available}"
            ),
        }
    }
}

impl TicketError {
    /// True for rejections caused by the ticket's validity window.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::NotYetValid { .. } | Self::Expired { .. })
    }

    /// True for rejections caused by malformed ticket bytes or text.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Decode(_)
                | Self::Truncated(_)
                | Self::MissingField(_)
                | Self::InvalidField { .. }
        )
    }
}
