//! Fuzzing target for ticket framing and projection.

#![no_main]
use libfuzzer_sys::fuzz_target;
use sso_ticket::canonical::canonical_from_records;
use sso_ticket::record::parse_records;

fuzz_target!(|data: &[u8]| {
    // Framing must never panic, and canonical bytes never exceed the input.
    if let Ok(stream) = parse_records(data) {
        assert!(canonical_from_records(&stream).len() <= data.len());
    }
    let _ = sso_ticket::parse_ticket(data);
});
