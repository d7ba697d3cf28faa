#[cfg(test)]
mod tests {
    use base64::Engine;
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
    use proptest::prelude::*;

    use crate::canonical::canonical_from_records;
    use crate::error::TicketError;
    use crate::fields::SIGNATURE_TAG;
    use crate::record::{parse_records, read_u32_be};
    use crate::transport::decode_ticket;

    fn encode_unit(tag: u8, content: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        out.extend_from_slice(&(content.len() as u16).to_be_bytes());
        out.extend_from_slice(content);
        out
    }

    fn units_strategy() -> impl Strategy<Value = Vec<(u8, Vec<u8>)>> {
        prop::collection::vec(
            (
                prop_oneof![Just(SIGNATURE_TAG), any::<u8>()],
                prop::collection::vec(any::<u8>(), 0..300),
            ),
            0..12,
        )
    }

    proptest! {
        // Arbitrary input must be framed or rejected, never panic.
        #[test]
        fn test_parse_arbitrary_bytes(buf in prop::collection::vec(any::<u8>(), 0..600)) {
            let _ = parse_records(&buf);
        }

        // Framing preserves every unit and its wire bytes.
        #[test]
        fn test_framing_preserves_units(
            version in any::<u8>(),
            code_page in any::<[u8; 4]>(),
            units in units_strategy()
        ) {
            let mut buf = vec![version];
            buf.extend_from_slice(&code_page);
            for (tag, content) in &units {
                buf.extend_from_slice(&encode_unit(*tag, content));
            }

            let stream = parse_records(&buf).unwrap();
            prop_assert_eq!(stream.version, version);
            prop_assert_eq!(stream.code_page, code_page);
            prop_assert_eq!(stream.units.len(), units.len());
            for (unit, (tag, content)) in stream.units.iter().zip(&units) {
                prop_assert_eq!(unit.tag, *tag);
                prop_assert_eq!(&unit.content, content);
                prop_assert_eq!(&unit.raw, &encode_unit(*tag, content));
            }
        }

        // Canonical bytes are the input with signature units cut out.
        #[test]
        fn test_canonical_drops_only_signature(
            code_page in any::<[u8; 4]>(),
            units in units_strategy()
        ) {
            let mut buf = vec![0x02];
            buf.extend_from_slice(&code_page);
            let mut expected = buf.clone();
            for (tag, content) in &units {
                let encoded = encode_unit(*tag, content);
                buf.extend_from_slice(&encoded);
                if *tag != SIGNATURE_TAG {
                    expected.extend_from_slice(&encoded);
                }
            }

            let stream = parse_records(&buf).unwrap();
            prop_assert_eq!(canonical_from_records(&stream), expected);
        }

        // Cutting a stream anywhere but a unit boundary is an error.
        #[test]
        fn test_truncation_is_never_silent(
            units in prop::collection::vec(
                (any::<u8>(), prop::collection::vec(any::<u8>(), 0..64)),
                1..6
            ),
            cut in any::<prop::sample::Index>()
        ) {
            let mut buf = vec![0x02, b'1', b'1', b'0', b'0'];
            let mut boundaries = vec![buf.len()];
            for (tag, content) in &units {
                buf.extend_from_slice(&encode_unit(*tag, content));
                boundaries.push(buf.len());
            }

            let cut = cut.index(buf.len());
            let result = parse_records(&buf[..cut]);
            if cut < 5 {
                prop_assert!(matches!(result, Err(TicketError::Truncated(_))));
            } else if boundaries.contains(&cut) {
                let expected = boundaries.iter().position(|b| *b == cut).unwrap();
                prop_assert_eq!(result.unwrap().units.len(), expected);
            } else {
                prop_assert!(matches!(result, Err(TicketError::Truncated(_))));
            }
        }

        #[test]
        fn test_read_u32_be_matches_std(bytes in any::<[u8; 4]>(), tail in prop::collection::vec(any::<u8>(), 0..4)) {
            let mut long = bytes.to_vec();
            long.extend_from_slice(&tail);
            prop_assert_eq!(read_u32_be(&long), u32::from_be_bytes(bytes));
        }

        #[test]
        fn test_read_u32_be_short_is_zero(short in prop::collection::vec(any::<u8>(), 0..4)) {
            prop_assert_eq!(read_u32_be(&short), 0);
        }

        // Issuer-side transport encoding is undone exactly.
        #[test]
        fn test_transport_decoding_inverts_encoding(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes).replace('+', "!");
            let text = utf8_percent_encode(&b64, NON_ALPHANUMERIC).to_string();
            prop_assert_eq!(decode_ticket(&text).unwrap().into_vec(), bytes);
        }
    }
}
