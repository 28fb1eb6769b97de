use fixedreg::fixed::{
    self, decode_with, encode_with, DecodeOptions, EncodeOptions, Error, Format, FRACTIONAL_DIGITS,
};
use proptest::prelude::*;

const EDGE_WORDS: [u32; 10] = [
    0,
    1,
    2,
    3,
    0x5555_5555,
    0xaaaa_aaaa,
    0x1234_5678,
    0x7fff_ffff,
    0x8000_0001,
    u32::MAX,
];

fn round_trip(value: u32, format: Format) -> u32 {
    let text = encode_with(value, format, &EncodeOptions::default());
    decode_with(&text, format, &DecodeOptions::default())
        .unwrap_or_else(|e| panic!("{} ({}) failed to decode: {}", text, format, e))
}

// Largest loss, in units of the lowest fractional bit. Up to 9 fractional
// bits the nine digits are exact and only the dropped bit is lost. Beyond
// that, truncating to nine digits can cost one more step of 2^-(F-1).
fn max_loss(bits: u8) -> u32 {
    match bits {
        0 => 0,
        1..=10 => 1,
        11..=30 => 3,
        _ => 5,
    }
}

fn check_unsigned_round_trip(value: u32, bits: u8) -> Result<(), TestCaseError> {
    let format = Format::unsigned(bits).unwrap();
    let decoded = round_trip(value, format);

    prop_assert!(decoded <= value, "{:#x} grew to {:#x} ({})", value, decoded, format);
    prop_assert!(
        value - decoded <= max_loss(bits),
        "{:#x} decoded as {:#x} ({})",
        value,
        decoded,
        format
    );

    Ok(())
}

fn check_signed_round_trip(value: u32, bits: u8) -> Result<(), TestCaseError> {
    let format = Format::signed(bits).unwrap();
    let original = value as i32;
    let decoded = round_trip(value, format) as i32;

    prop_assert!(
        decoded.unsigned_abs() <= original.unsigned_abs(),
        "{} became {} ({})",
        original,
        decoded,
        format
    );
    prop_assert!(
        original.abs_diff(decoded) <= max_loss(bits),
        "{} became {} ({})",
        original,
        decoded,
        format
    );

    Ok(())
}

fn check_wrapping_matches_rejecting(
    value: u32,
    bits: u8,
    signed: bool,
) -> Result<(), TestCaseError> {
    let format = Format::new(bits, signed).unwrap();
    let text = encode_with(value, format, &EncodeOptions::default());

    prop_assert_eq!(
        decode_with(&text, format, &DecodeOptions::wrapping()),
        decode_with(&text, format, &DecodeOptions::default()),
        "{} ({})",
        text,
        format
    );

    Ok(())
}

proptest! {
    #[test]
    fn unsigned_round_trip_only_loses_low_bits(value in any::<u32>(), bits in 0u8..=31) {
        check_unsigned_round_trip(value, bits)?;
    }

    #[test]
    fn round_trip_is_exact_after_masking_bit_zero_up_to_ten_bits(
        value in any::<u32>(),
        bits in 1u8..=10
    ) {
        prop_assert_eq!(round_trip(value, Format::unsigned(bits).unwrap()), value & !1);
    }

    #[test]
    fn round_trip_is_exact_without_fraction_bits(value in any::<u32>()) {
        prop_assert_eq!(round_trip(value, Format::unsigned(0).unwrap()), value);
    }

    #[test]
    fn signed_round_trip_truncates_toward_zero(value in any::<u32>(), bits in 0u8..=31) {
        // 0x8000_0000 has no positive counterpart
        prop_assume!(value != 0x8000_0000);
        check_signed_round_trip(value, bits)?;
    }

    #[test]
    fn nine_fraction_digits_for_every_width(
        value in any::<u32>(),
        bits in 0u8..=31,
        signed in any::<bool>()
    ) {
        let text = fixed::encode(value, bits, signed).unwrap();
        let digits = text.rsplit('.').next().unwrap();

        prop_assert_eq!(digits.len(), FRACTIONAL_DIGITS, "{}", text);
    }

    #[test]
    fn integer_words_without_fraction_bits(value in any::<u32>()) {
        prop_assert_eq!(
            fixed::encode(value, 0, false).unwrap(),
            format!("{}.000000000", value)
        );
    }

    #[test]
    fn wrapping_matches_rejecting_for_values_in_range(
        value in any::<u32>(),
        bits in 0u8..=31,
        signed in any::<bool>()
    ) {
        check_wrapping_matches_rejecting(value, bits, signed)?;
    }
}

#[test]
fn edge_words_round_trip() {
    for bits in 0..=31 {
        for &value in EDGE_WORDS.iter() {
            check_unsigned_round_trip(value, bits).unwrap();
            check_signed_round_trip(value, bits).unwrap();

            for &signed in &[false, true] {
                check_wrapping_matches_rejecting(value, bits, signed).unwrap();
            }
        }
    }

    for bits in 1..=10 {
        for &value in EDGE_WORDS.iter() {
            assert_eq!(round_trip(value, Format::unsigned(bits).unwrap()), value & !1);
        }
    }
}

#[test]
fn most_negative_word_round_trips_to_zero() {
    let format = Format::signed(16).unwrap();

    assert_eq!(round_trip(0x8000_0000, format), 0);
}

#[test]
fn extra_fraction_digits_are_ignored() {
    for bits in 0..=31 {
        assert_eq!(
            fixed::decode("1.123456789999", bits, false),
            fixed::decode("1.123456789", bits, false)
        );
    }
}

#[test]
fn signed_text_round_trip() {
    let word = fixed::decode("-2.5", 16, true).unwrap();
    let text = fixed::encode(word, 16, true).unwrap();

    assert!(text.starts_with("-2."), "{}", text);
    assert_eq!(text, "-2.500000000");
}

#[test]
fn zero() {
    assert_eq!(fixed::encode(0, 8, false).unwrap(), "0.000000000");
    assert_eq!(
        encode_with(0, Format::unsigned(8).unwrap(), &EncodeOptions::with_newline()),
        "0.000000000\n"
    );
    assert_eq!(fixed::decode("0", 8, false).unwrap(), 0);
}

#[test]
fn separators_are_ignored() {
    for bits in 0..=20 {
        assert_eq!(
            fixed::decode("1,234.500000000", bits, false),
            fixed::decode("1234.5", bits, false)
        );
    }
}

#[test]
fn rejects_out_of_range_parameters() {
    assert_eq!(fixed::encode(0, 32, false), Err(Error::InvalidFractionalBits(32)));
    assert_eq!(fixed::decode("0", 32, true), Err(Error::InvalidFractionalBits(32)));
}
