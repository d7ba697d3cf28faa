//! Ticket validity window.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::{Result, TicketError};
use crate::record::read_u32_be;

/// Significant prefix of `create_time`: `YYYYMMDDHHMM`.
pub const CREATE_TIME_LEN: usize = 12;

/// Absolute interval during which a ticket is accepted. Both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ValidityWindow {
    /// Derive the window from the raw `create_time`, `valid_time` (hours)
    /// and `valid_time_min` (minutes) fields. Absent durations count as zero.
    pub fn from_fields(
        create_time: &[u8],
        valid_time: Option<&[u8]>,
        valid_time_min: Option<&[u8]>,
    ) -> Result<Self> {
        let start = parse_create_time(create_time)?;
        let hours = i64::from(read_u32_be(valid_time.unwrap_or_default()));
        let minutes = i64::from(read_u32_be(valid_time_min.unwrap_or_default()));
        // Durations reaching past chrono's range never expire.
        let end = start
            .checked_add_signed(Duration::seconds(hours * 3600 + minutes * 60))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Ok(Self { start, end })
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    /// Accept `now` if it falls inside the window.
    pub fn check(&self, now: DateTime<Utc>) -> Result<()> {
        if now < self.start {
            return Err(TicketError::NotYetValid { start: self.start });
        }
        if now > self.end {
            return Err(TicketError::Expired { end: self.end });
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Parse the UTC creation timestamp; characters past the twelfth are ignored.
pub fn parse_create_time(raw: &[u8]) -> Result<DateTime<Utc>> {
    let digits = raw
        .get(..CREATE_TIME_LEN)
        .ok_or(TicketError::MissingField("create_time"))?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid_create_time(format!(
            "expected {CREATE_TIME_LEN} digits, got {:?}",
            String::from_utf8_lossy(digits)
        )));
    }

    let number = |range: std::ops::Range<usize>| {
        digits[range]
            .iter()
            .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'))
    };
    let (year, month, day) = (number(0..4), number(4..6), number(6..8));
    let (hour, minute) = (number(8..10), number(10..12));

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            invalid_create_time(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02} is not a valid time"
            ))
        })
}

fn invalid_create_time(reason: String) -> TicketError {
    TicketError::InvalidField {
        field: "create_time",
        reason,
    }
}
