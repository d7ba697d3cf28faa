//! Record stream framing.
//!
//! Wire layout, all integers big-endian:
//!
//! ```text
//! offset 0   version     1 byte
//! offset 1   code page   4 bytes
//! offset 5.. info units  { tag: 1, length: 2, content: length }*
//! ```
//!
//! The parser only frames records. Tag semantics live in [`crate::fields`].

use crate::error::{Result, TicketError, Truncation};
use crate::fields::FieldKey;

/// One tag-length-value record of the ticket body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoUnit {
    pub tag: u8,
    pub content: Vec<u8>,
    /// Tag, length and content exactly as they appeared on the wire.
    pub raw: Vec<u8>,
}

impl InfoUnit {
    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Resolved field name, or the raw tag when the tag is not known.
    pub fn name(&self) -> FieldKey {
        FieldKey::from_tag(self.tag)
    }
}

/// Framed ticket before any field interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStream {
    pub version: u8,
    pub code_page: [u8; 4],
    pub units: Vec<InfoUnit>,
}

/// Cursor over the info unit section of a ticket.
pub struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> RecordReader<'a> {
    /// Start reading info units from `body` (the bytes after the header).
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            buf: body,
            pos: 0,
            failed: false,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn take_byte(&mut self, part: Truncation) -> Result<u8> {
        let byte = *self
            .remaining()
            .first()
            .ok_or(TicketError::Truncated(part))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read the next info unit.
    ///
    /// Returns `Ok(None)` only when the stream is exhausted exactly at a tag
    /// boundary. A stream that ends anywhere else is an error.
    pub fn next_unit(&mut self) -> Result<Option<InfoUnit>> {
        let start = self.pos;
        let Some(&tag) = self.remaining().first() else {
            return Ok(None);
        };
        self.pos += 1;

        let high = self.take_byte(Truncation::LengthHigh)?;
        let low = self.take_byte(Truncation::LengthLow)?;
        let length = usize::from(u16::from_be_bytes([high, low]));

        let available = self.remaining().len();
        if available < length {
            return Err(TicketError::Truncated(Truncation::Content {
                expected: length,
                available,
            }));
        }
        let content = self.remaining()[..length].to_vec();
        self.pos += length;

        Ok(Some(InfoUnit {
            tag,
            content,
            raw: self.buf[start..self.pos].to_vec(),
        }))
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<InfoUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_unit() {
            Ok(unit) => unit.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Frame a decoded ticket into its header and ordered info units.
pub fn parse_records(buf: &[u8]) -> Result<RecordStream> {
    let (&version, rest) = buf
        .split_first()
        .ok_or(TicketError::Truncated(Truncation::Version))?;

    let code_page: [u8; 4] = rest
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(TicketError::Truncated(Truncation::CodePage))?;

    let units = RecordReader::new(&rest[4..]).collect::<Result<Vec<_>>>()?;

    Ok(RecordStream {
        version,
        code_page,
        units,
    })
}

/// Decode a big-endian unsigned 32-bit integer from the first four bytes.
///
/// Slices shorter than four bytes, including the empty slice, decode to 0.
pub fn read_u32_be(bytes: &[u8]) -> u32 {
    bytes
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_be_bytes)
        .unwrap_or(0)
}
