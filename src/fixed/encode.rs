use super::{EncodeOptions, Format, FRACTIONAL_DIGITS, SIGN_BIT};

// Longest output: sign, 10 integer digits, point, fraction, line feed
const MAX_ENCODED_LEN: usize = 1 + 10 + 1 + FRACTIONAL_DIGITS + 1;

/// Converts a fixed-point word to decimal text using the specified options.
///
/// The output always contains exactly [`FRACTIONAL_DIGITS`] digits after the
/// decimal point.
///
/// [`FRACTIONAL_DIGITS`]: super::FRACTIONAL_DIGITS
pub fn encode_with(value: u32, format: Format, options: &EncodeOptions) -> String {
    let mut buf = String::with_capacity(MAX_ENCODED_LEN);
    let bits = u32::from(format.fractional_bits());
    let mut value = value;

    if format.is_signed() {
        if value & SIGN_BIT != 0 {
            buf.push('-');
            value = value.wrapping_neg();
        }

        // Only 0x8000_0000 still has the sign bit set after negation
        value &= !SIGN_BIT;
    }

    push_integer(&mut buf, value >> bits);
    buf.push('.');

    if bits == 0 {
        buf.extend(std::iter::repeat('0').take(FRACTIONAL_DIGITS));
    } else {
        push_fraction(&mut buf, value & format.fraction_mask(), bits);
    }

    if options.newline {
        buf.push('\n');
    }

    buf
}

fn push_integer(buf: &mut String, int_part: u32) {
    let mut magnitude = 1;
    while int_part / magnitude > 9 {
        magnitude *= 10;
    }

    let mut remainder = int_part;
    while magnitude > 0 {
        push_digit(buf, remainder / magnitude);
        remainder %= magnitude;
        magnitude /= 10;
    }
}

// Expands the fraction one decimal digit at a time. The lowest fractional bit
// is dropped first, so digits are read from bit `bits - 1` and every step only
// keeps the bits below it. Widened to u64 so `* 10` can't wrap at 31 bits.
fn push_fraction(buf: &mut String, fraction: u32, bits: u32) {
    let point = bits - 1;
    let keep = u64::from(super::mask(point as u8));
    let mut acc = u64::from(fraction >> 1);

    for _ in 0..FRACTIONAL_DIGITS {
        acc *= 10;
        push_digit(buf, (acc >> point) as u32);
        acc &= keep;
    }
}

#[inline]
fn push_digit(buf: &mut String, digit: u32) {
    buf.push(char::from(b'0' + digit as u8));
}
