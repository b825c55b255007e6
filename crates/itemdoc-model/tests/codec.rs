//! Property tests for the raw bit-vector codec.

use itemdoc_model::Bits;
use itemdoc_model::codec::{decode_bits, decode_number, encode_bits, encode_number};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decoded_length_is_padded_to_nibbles(bits in prop::collection::vec(any::<bool>(), 0..200)) {
        let decoded = decode_bits(&encode_bits(&bits));
        prop_assert_eq!(decoded.len(), bits.len().div_ceil(4) * 4);
    }

    #[test]
    fn decoded_prefix_matches_input(bits in prop::collection::vec(any::<bool>(), 0..200)) {
        let decoded = decode_bits(&encode_bits(&bits));
        prop_assert_eq!(&decoded[..bits.len()], bits.as_slice());
        prop_assert!(decoded[bits.len()..].iter().all(|bit| !bit));
    }

    #[test]
    fn encoding_is_lowercase_hex(bits in prop::collection::vec(any::<bool>(), 0..64)) {
        let text = encode_bits(&bits);
        prop_assert!(text.chars().all(|ch| ch.is_ascii_digit() || ('a'..='f').contains(&ch)));
    }

    #[test]
    fn hex_text_survives_decode_encode(text in "[0-9a-f]{0,32}") {
        prop_assert_eq!(encode_bits(&decode_bits(&text)), text);
    }

    #[test]
    fn finite_numbers_round_trip(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        prop_assert_eq!(decode_number(&encode_number(value)), value);
    }
}

#[test]
fn bits_padding_helper_matches_codec() {
    let bits = Bits::new(vec![true, false, true, true, true]);
    let round = Bits::from_hex(&bits.to_hex());
    assert_eq!(round, bits.padded());
    assert_eq!(round.len(), 8);
}

#[test]
fn bits_serialize_as_hex() {
    let bits = Bits::new(vec![true, true, true, true, false, false, false, true]);
    assert_eq!(serde_json::to_string(&bits).unwrap(), "\"f8\"");
}
