//! Request integration.
//!
//! Web frameworks differ in how they expose cookies and query parameters,
//! so the gateway only needs a [`TicketSource`]. The query parameter is
//! consulted before the cookie.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TicketError};
use crate::signature::TrustAnchor;
use crate::verify::TicketVerifier;

/// Conventional cookie and parameter name carrying the ticket.
pub const DEFAULT_TICKET_NAME: &str = "MYSAPSSO2";

/// Lookup of request-scoped values.
pub trait TicketSource {
    fn param(&self, name: &str) -> Option<&str>;
    fn cookie(&self, name: &str) -> Option<&str>;
}

/// In-memory [`TicketSource`], for tools and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub params: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
}

impl StaticSource {
    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }
}

impl TicketSource for StaticSource {
    fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Gateway configuration.
///
/// # Example TOML
///
/// ```toml
/// ticket_name = "MYSAPSSO2"
/// trust_certificate = "MIIB..."  # base64 DER
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_ticket_name")]
    pub ticket_name: String,

    /// Base64-wrapped DER certificate of the ticket issuer.
    #[serde(default)]
    pub trust_certificate: Option<String>,
}

fn default_ticket_name() -> String {
    DEFAULT_TICKET_NAME.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ticket_name: default_ticket_name(),
            trust_certificate: None,
        }
    }
}

/// Resolves the authenticated user of a request.
#[derive(Debug, Clone)]
pub struct TicketGateway {
    ticket_name: String,
    verifier: TicketVerifier,
}

impl TicketGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        if config.ticket_name.trim().is_empty() {
            return Err(TicketError::Configuration(
                "ticket_name must not be empty".to_string(),
            ));
        }
        let encoded = config
            .trust_certificate
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                TicketError::Configuration(
                    "trust_certificate must be set to the issuer's base64 DER certificate"
                        .to_string(),
                )
            })?;
        let anchor = TrustAnchor::from_base64(encoded)?;
        debug!(subject = %anchor.subject(), "ticket gateway configured");

        Ok(Self {
            ticket_name: config.ticket_name.clone(),
            verifier: TicketVerifier::new(anchor),
        })
    }

    pub fn ticket_name(&self) -> &str {
        &self.ticket_name
    }

    pub fn verifier(&self) -> &TicketVerifier {
        &self.verifier
    }

    /// Ticket text from the request, parameter first.
    pub fn ticket_text<'a, S: TicketSource + ?Sized>(&self, source: &'a S) -> Option<&'a str> {
        source
            .param(&self.ticket_name)
            .or_else(|| source.cookie(&self.ticket_name))
    }

    /// Verify the request's ticket and return the user it authenticates.
    pub fn extract_user<S: TicketSource + ?Sized>(
        &self,
        source: &S,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let text = self.ticket_text(source).ok_or_else(|| {
            warn!(name = %self.ticket_name, "request carries no ticket");
            TicketError::TicketAbsent {
                name: self.ticket_name.clone(),
            }
        })?;
        let ticket = self.verifier.verify_text(text, now)?;
        ticket.user().ok_or(TicketError::MissingField("user"))
    }
}
