use super::{DecodeOptions, Error, Format, Overflow, Result, FRACTIONAL_DIGITS, MAX_INPUT_LEN};

// Denominator of a fraction padded to FRACTIONAL_DIGITS digits
const FRACTION_SCALE: u64 = 1_000_000_000;

/// Converts decimal text to a fixed-point word using the specified options.
pub fn decode_with(text: &str, format: Format, options: &DecodeOptions) -> Result<u32> {
    decode_bytes(text.as_bytes(), format, options)
}

/// Converts a decimal byte string to a fixed-point word using the specified options.
///
/// This accepts buffers as they arrive from a file or attribute write,
/// including a trailing line feed or NUL padding.
pub fn decode_bytes(text: &[u8], format: Format, options: &DecodeOptions) -> Result<u32> {
    let scratch = strip(text)?;
    let number = Decimal::parse(&scratch)?;

    number.to_word(format, options.overflow)
}

fn is_separator(b: u8) -> bool {
    matches!(b, b',' | b' ' | b'\r' | b'\n')
}

// Copy everything up to the first NUL into the scratch buffer, minus
// separators. Stops at the first character that doesn't fit.
fn strip(text: &[u8]) -> Result<Vec<u8>> {
    let mut scratch = Vec::with_capacity(MAX_INPUT_LEN);

    for &b in text.iter().take_while(|&&b| b != 0) {
        if is_separator(b) {
            continue;
        }

        if scratch.len() == MAX_INPUT_LEN {
            return Err(Error::InputTooLong {
                len: MAX_INPUT_LEN + 1,
                max: MAX_INPUT_LEN,
            });
        }
        scratch.push(b);
    }

    Ok(scratch)
}

// Unsigned decimal number split at the point. The fraction is scaled by
// FRACTION_SCALE, so "0.5" is stored as 500_000_000.
#[derive(Debug, PartialEq, Eq)]
struct Decimal {
    negative: bool,
    int_part: u32,
    int_overflow: bool,
    fraction: u64,
}

impl Decimal {
    fn parse(text: &[u8]) -> Result<Decimal> {
        let mut number = Decimal {
            negative: text.first() == Some(&b'-'),
            int_part: 0,
            int_overflow: false,
            fraction: 0,
        };

        let start = usize::from(number.negative);
        let mut seen_point = false;
        let mut seen_digit = false;
        let mut fraction_len = 0;

        for (index, &b) in text.iter().enumerate().skip(start) {
            match b {
                b'.' if !seen_point => seen_point = true,
                b'0'..=b'9' => {
                    let digit = b - b'0';
                    seen_digit = true;

                    if !seen_point {
                        number.push_int_digit(digit);
                    } else if fraction_len < FRACTIONAL_DIGITS {
                        number.fraction = number.fraction * 10 + u64::from(digit);
                        fraction_len += 1;
                    }
                }
                _ => {
                    return Err(Error::InvalidCharacter {
                        index,
                        character: char::from(b),
                    })
                }
            }
        }

        if !seen_digit {
            return Err(Error::NoDigits);
        }

        for _ in fraction_len..FRACTIONAL_DIGITS {
            number.fraction *= 10;
        }

        Ok(number)
    }

    // Keeps the low 32 bits of the integer part and remembers if any were lost
    fn push_int_digit(&mut self, digit: u8) {
        match self
            .int_part
            .checked_mul(10)
            .and_then(|n| n.checked_add(u32::from(digit)))
        {
            Some(n) => self.int_part = n,
            None => {
                self.int_overflow = true;
                self.int_part = self
                    .int_part
                    .wrapping_mul(10)
                    .wrapping_add(u32::from(digit));
            }
        }
    }

    // Binary fraction bits, most significant first, by repeated doubling. The
    // first step tests the units position, which is always clear, so the
    // result spans bits 1..=bits and bit 0 stays zero.
    fn fraction_bits(&self, bits: u32) -> u32 {
        let mut remainder = self.fraction;
        let mut acc: u32 = 0;

        for _ in 0..bits {
            if remainder >= FRACTION_SCALE {
                acc += 1;
                remainder -= FRACTION_SCALE;
            }
            remainder *= 2;
            acc <<= 1;
        }

        acc
    }

    fn to_word(&self, format: Format, overflow: Overflow) -> Result<u32> {
        let bits = u32::from(format.fractional_bits());
        let fraction = self.fraction_bits(bits);
        let magnitude = (self.int_part << bits) | fraction;

        if overflow == Overflow::Error {
            let max_int = u32::MAX >> bits;
            if self.int_overflow || self.int_part > max_int {
                return Err(Error::Overflow { format });
            }

            let limit = match (format.is_signed(), self.negative) {
                (true, true) => u64::from(super::SIGN_BIT),
                (true, false) => u64::from(super::SIGN_BIT) - 1,
                (false, true) => 0,
                (false, false) => u64::from(u32::MAX),
            };

            let exact = (u64::from(self.int_part) << bits) | u64::from(fraction);
            if exact > limit {
                return Err(Error::Overflow { format });
            }
        }

        if format.is_signed() && self.negative {
            Ok(magnitude.wrapping_neg())
        } else {
            Ok(magnitude)
        }
    }
}
