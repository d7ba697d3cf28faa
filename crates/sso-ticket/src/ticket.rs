//! Parsed logon ticket.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, TicketError};
use crate::fields::{project, FieldKey, FieldName, SIGNATURE_TAG};
use crate::record::{parse_records, InfoUnit, RecordStream};
use crate::validity::{ValidityWindow, CREATE_TIME_LEN};

/// SAP code page for UTF-8 encoded tickets.
pub const CODE_PAGE_UTF8: &[u8; 4] = b"4110";

/// A framed and projected ticket.
///
/// `units` is authoritative and keeps every record in wire order;
/// `fields` is a lookup view in which the last duplicate wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTicket {
    pub version: u8,
    pub code_page: [u8; 4],
    pub fields: BTreeMap<FieldKey, Vec<u8>>,
    pub units: Vec<InfoUnit>,
    pub validity: ValidityWindow,
}

/// Parse decoded ticket bytes. Does not verify the signature.
pub fn parse_ticket(buf: &[u8]) -> Result<ParsedTicket> {
    let RecordStream {
        version,
        code_page,
        units,
    } = parse_records(buf)?;
    let fields = project(&units);

    debug!(
        version,
        code_page = %hex::encode(code_page),
        units = units.len(),
        "framed ticket"
    );

    let create_time = fields
        .get(&FieldKey::Known(FieldName::CreateTime))
        .filter(|v| v.len() >= CREATE_TIME_LEN)
        .ok_or(TicketError::MissingField("create_time"))?;
    let validity = ValidityWindow::from_fields(
        create_time,
        fields
            .get(&FieldKey::Known(FieldName::ValidTime))
            .map(Vec::as_slice),
        fields
            .get(&FieldKey::Known(FieldName::ValidTimeMin))
            .map(Vec::as_slice),
    )?;

    Ok(ParsedTicket {
        version,
        code_page,
        fields,
        units,
        validity,
    })
}

impl ParsedTicket {
    pub fn field(&self, name: FieldName) -> Option<&[u8]> {
        self.fields.get(&FieldKey::Known(name)).map(Vec::as_slice)
    }

    /// Look up a field by numeric tag, known or not.
    pub fn field_by_tag(&self, tag: u8) -> Option<&[u8]> {
        self.fields.get(&FieldKey::from_tag(tag)).map(Vec::as_slice)
    }

    /// Every unit carrying `tag`, in wire order.
    pub fn units_with_tag(&self, tag: u8) -> impl Iterator<Item = &InfoUnit> {
        self.units.iter().filter(move |u| u.tag == tag)
    }

    pub fn signature(&self) -> Option<&[u8]> {
        self.field_by_tag(SIGNATURE_TAG)
    }

    pub fn code_page_str(&self) -> String {
        String::from_utf8_lossy(&self.code_page).into_owned()
    }

    /// Decode a textual field.
    ///
    /// `*_utf` fields and tickets in code page 4110 are UTF-8; everything
    /// else is ISO-8859-1, where each byte is the code point of the same value.
    pub fn text(&self, name: FieldName) -> Option<String> {
        let bytes = self.field(name)?;
        Some(if name.is_utf8() || &self.code_page == CODE_PAGE_UTF8 {
            String::from_utf8_lossy(bytes).into_owned()
        } else {
            bytes.iter().map(|&b| char::from(b)).collect()
        })
    }

    /// The authenticated user, preferring the code page field over `user_utf`.
    pub fn user(&self) -> Option<String> {
        self.text(FieldName::User)
            .or_else(|| self.text(FieldName::UserUtf))
    }
}
