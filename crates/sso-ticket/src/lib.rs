#![forbid(unsafe_code)]

//! SAP Logon Ticket verification
//!
//! This crate decodes and verifies the `MYSAPSSO2` single sign-on ticket:
//! - Transport decoding (URL escaping, `!`-for-`+` Base64)
//! - Byte-exact framing of the header and info unit stream
//! - Projection of known tags onto field names
//! - Reconstruction of the signed bytes
//! - Detached PKCS#7 verification against an explicit trust certificate
//! - Validity window evaluation
//!
//! ```no_run
//! use chrono::Utc;
//! use sso_ticket::{verify_ticket_text, TrustAnchor};
//!
//! # fn run(cookie: &str, cert_der: &[u8]) -> sso_ticket::Result<()> {
//! let anchor = TrustAnchor::from_der(cert_der)?;
//! let ticket = verify_ticket_text(cookie, &anchor, Utc::now())?;
//! println!("authenticated {:?}", ticket.user());
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod error;
pub mod fields;
pub mod gateway;
pub mod record;
pub mod signature;
pub mod ticket;
pub mod transport;
pub mod validity;
pub mod verify;

#[cfg(test)]
mod proptests;

pub use canonical::canonical_bytes;
pub use error::{Result, TicketError, Truncation};
pub use fields::{FieldKey, FieldName};
pub use gateway::{GatewayConfig, StaticSource, TicketGateway, TicketSource};
pub use record::{read_u32_be, InfoUnit};
pub use signature::{verify_signature, verify_signature_der, TrustAnchor};
pub use ticket::{parse_ticket, ParsedTicket};
pub use transport::{decode_ticket, RawTicket};
pub use validity::ValidityWindow;
pub use verify::{verify_ticket, verify_ticket_text, TicketVerifier};
