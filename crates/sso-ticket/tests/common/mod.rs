//! Test ticket issuer.
//!
//! Mints tickets the way an SAP system does: header and info units, then a
//! detached PKCS#7 signature over those bytes appended as unit 255.

#![allow(dead_code)]

use std::sync::OnceLock;

use base64::Engine;
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::{X509NameBuilder, X509};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use sso_ticket::TrustAnchor;

pub const SERIAL_ONE: u32 = 0x1234_5678;
pub const SERIAL_TWO: u32 = 0x2345_6789;

pub struct Issuer {
    pub key: PKey<Private>,
    pub cert: X509,
}

impl Issuer {
    /// Self-signed issuer. All test issuers share one subject so that only
    /// the serial number tells their signatures apart.
    pub fn generate(serial: u32) -> Self {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "EP4").unwrap();
        name.append_entry_by_text("OU", "J2EE").unwrap();
        let name = name.build();

        let yesterday = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
            - 86_400;

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder
            .set_serial_number(&BigNum::from_u32(serial).unwrap().to_asn1_integer().unwrap())
            .unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&Asn1Time::from_unix(yesterday).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(365).unwrap())
            .unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();

        Self {
            key,
            cert: builder.build(),
        }
    }

    pub fn cert_der(&self) -> Vec<u8> {
        self.cert.to_der().unwrap()
    }

    pub fn cert_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.cert_der())
    }

    pub fn anchor(&self) -> TrustAnchor {
        TrustAnchor::from_der(&self.cert_der()).unwrap()
    }

    /// Detached signature over `data`, without embedded certificates.
    pub fn sign_detached(&self, data: &[u8]) -> Vec<u8> {
        let certs: Stack<X509> = Stack::new().unwrap();
        let flags = Pkcs7Flags::DETACHED | Pkcs7Flags::BINARY | Pkcs7Flags::NOCERTS;
        Pkcs7::sign(&self.cert, &self.key, &certs, data, flags)
            .unwrap()
            .to_der()
            .unwrap()
    }

    /// Append the signature unit to an unsigned ticket.
    pub fn sign(&self, unsigned: &[u8]) -> Vec<u8> {
        let signature = self.sign_detached(unsigned);
        let mut out = unsigned.to_vec();
        out.extend_from_slice(&unit(255, &signature));
        out
    }
}

pub fn issuer_one() -> &'static Issuer {
    static ISSUER: OnceLock<Issuer> = OnceLock::new();
    ISSUER.get_or_init(|| Issuer::generate(SERIAL_ONE))
}

pub fn issuer_two() -> &'static Issuer {
    static ISSUER: OnceLock<Issuer> = OnceLock::new();
    ISSUER.get_or_init(|| Issuer::generate(SERIAL_TWO))
}

pub fn unit(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend_from_slice(&(content.len() as u16).to_be_bytes());
    out.extend_from_slice(content);
    out
}

/// Unsigned ticket body in code page 1100.
pub fn unsigned_ticket(user: &str, create_time: &str, hours: u32, minutes: u32) -> Vec<u8> {
    let mut out = vec![0x02, b'1', b'1', b'0', b'0'];
    for u in [
        unit(1, user.as_bytes()),
        unit(2, b"000"),
        unit(3, b"EP4"),
        unit(4, create_time.as_bytes()),
        unit(5, &hours.to_be_bytes()),
        unit(7, &minutes.to_be_bytes()),
        unit(10, user.as_bytes()),
        unit(32, format!("portal:{user}").as_bytes()),
        unit(136, b"basicauthentication"),
    ] {
        out.extend_from_slice(&u);
    }
    out
}

/// Ticket valid from 2012-05-08T00:00:00Z for 8 hours 30 minutes.
pub fn signed_ticket(issuer: &Issuer) -> Vec<u8> {
    issuer.sign(&unsigned_ticket("USER", "20120508000000", 8, 30))
}

/// Cookie form: Base64 with `!` for `+`, URL-escaped.
pub fn encode_text(raw: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD
        .encode(raw)
        .replace('+', "!");
    utf8_percent_encode(&b64, NON_ALPHANUMERIC).to_string()
}

/// Replace every occurrence of `from` with `to` (same length).
pub fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    assert_eq!(from.len(), to.len());
    let mut out = haystack.to_vec();
    let mut i = 0;
    while i + from.len() <= out.len() {
        if &out[i..i + from.len()] == from {
            out[i..i + from.len()].copy_from_slice(to);
            i += from.len();
        } else {
            i += 1;
        }
    }
    out
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
