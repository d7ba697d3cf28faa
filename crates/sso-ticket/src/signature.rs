//! Detached PKCS#7 signature verification.
//!
//! The signature unit holds a DER `SignedData` without encapsulated
//! content. OpenSSL checks it against the canonical ticket bytes using a
//! trust store that contains the configured certificate and nothing else.

use base64::Engine;
use openssl::error::ErrorStack;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509;
use tracing::debug;

use crate::error::{Result, TicketError};

/// Certificate that issued tickets are expected to be signed with.
#[derive(Clone)]
pub struct TrustAnchor {
    cert: X509,
}

impl std::fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustAnchor")
            .field("subject", &self.subject())
            .field("serial", &self.serial_hex())
            .finish()
    }
}

impl TrustAnchor {
    /// Parse a DER-encoded X.509 certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let cert = X509::from_der(der).map_err(|e| {
            TicketError::Configuration(format!(
                "trust certificate is not valid DER: {}",
                primary_reason(&e)
            ))
        })?;
        Ok(Self { cert })
    }

    /// Parse a Base64-wrapped DER certificate, as stored in configuration.
    /// Whitespace, including line breaks, is ignored.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(TicketError::Configuration(
                "trust certificate is empty".to_string(),
            ));
        }
        let der = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| {
                TicketError::Configuration(format!("trust certificate is not base64: {e}"))
            })?;
        Self::from_der(&der)
    }

    /// Subject as a comma-separated list of `short name=value` pairs.
    pub fn subject(&self) -> String {
        self.cert
            .subject_name()
            .entries()
            .map(|entry| {
                let key = entry.object().nid().short_name().unwrap_or("?");
                let value = entry.data().to_string().unwrap_or_default();
                format!("{key}={value}")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn serial_hex(&self) -> String {
        self.cert
            .serial_number()
            .to_bn()
            .and_then(|bn| bn.to_hex_str().map(|s| s.to_string()))
            .unwrap_or_default()
    }

    pub fn certificate(&self) -> &X509 {
        &self.cert
    }
}

/// Verify a detached PKCS#7 `signature` over `canonical` against `anchor`.
pub fn verify_signature(canonical: &[u8], signature: &[u8], anchor: &TrustAnchor) -> Result<()> {
    let pkcs7 = Pkcs7::from_der(signature).map_err(signature_error)?;

    let mut signers: Stack<X509> = Stack::new().map_err(signature_error)?;
    signers.push(anchor.cert.clone()).map_err(signature_error)?;

    let mut store = X509StoreBuilder::new().map_err(signature_error)?;
    store.add_cert(anchor.cert.clone()).map_err(signature_error)?;
    let store = store.build();

    pkcs7
        .verify(
            &signers,
            &store,
            Some(canonical),
            None,
            Pkcs7Flags::DETACHED,
        )
        .map_err(signature_error)?;

    debug!(
        canonical_len = canonical.len(),
        signer = %anchor.subject(),
        "signature verified"
    );
    Ok(())
}

/// Verify against a DER certificate that has not been parsed yet.
pub fn verify_signature_der(canonical: &[u8], signature: &[u8], cert_der: &[u8]) -> Result<()> {
    let anchor = TrustAnchor::from_der(cert_der)?;
    verify_signature(canonical, signature, &anchor)
}

/// Earliest reason on the OpenSSL error queue, which names the root cause
/// ("digest failure", "signer certificate not found", "BN lib", ...).
fn primary_reason(stack: &ErrorStack) -> String {
    stack
        .errors()
        .iter()
        .find_map(|e| e.reason())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown error".to_string())
}

fn signature_error(stack: ErrorStack) -> TicketError {
    debug!(errors = %stack, "openssl rejected signature");
    TicketError::SignatureInvalid {
        reason: primary_reason(&stack),
    }
}
