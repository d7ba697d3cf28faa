//! Fuzzing target for transport decoding of cookie text.

#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    if let Ok(raw) = sso_ticket::decode_ticket(text) {
        let _ = sso_ticket::parse_ticket(raw.as_bytes());
    }
});
