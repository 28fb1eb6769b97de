// Attribute text parsing, following the rules of the kernel's kstrtobool()
// and kstrtou*() helpers.

use super::{Error, Result};

pub(crate) fn parse_bool(text: &str) -> Result<bool> {
    let s = text.as_bytes();

    match s.first().copied() {
        Some(b'y' | b'Y' | b't' | b'T' | b'1') => Ok(true),
        Some(b'n' | b'N' | b'f' | b'F' | b'0') => Ok(false),
        Some(b'o' | b'O') => match s.get(1).copied() {
            Some(b'n' | b'N') => Ok(true),
            Some(b'f' | b'F') => Ok(false),
            _ => Err(Error::InvalidValue),
        },
        _ => Err(Error::InvalidValue),
    }
}

// Base is detected from the prefix: 0x for hex, 0 for octal, decimal otherwise.
// A single trailing line feed is allowed.
pub(crate) fn parse_unsigned(text: &str, max: u64) -> Result<u32> {
    let s = text.as_bytes();
    let s = s.strip_prefix(b"+").unwrap_or(s);

    let (radix, digits) = match s {
        [b'0', x, d, ..] if (*x | 0x20) == b'x' && d.is_ascii_hexdigit() => (16, &s[2..]),
        [b'0', ..] => (8, s),
        _ => (10, s),
    };

    let mut value: u64 = 0;
    let mut overflow = false;
    let mut count = 0;

    for &b in digits {
        let digit = match char::from(b).to_digit(16) {
            Some(d) if d < radix => u64::from(d),
            _ => break,
        };

        match value
            .checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(digit))
        {
            Some(v) => value = v,
            None => overflow = true,
        }
        count += 1;
    }

    if count == 0 {
        return Err(Error::InvalidValue);
    }
    if overflow {
        return Err(Error::OutOfRange);
    }

    let rest = &digits[count..];
    let rest = rest.strip_prefix(b"\n").unwrap_or(rest);
    if !rest.is_empty() {
        return Err(Error::InvalidValue);
    }

    if value > max {
        return Err(Error::OutOfRange);
    }

    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const U8_MAX: u64 = u8::MAX as u64;
    const U32_MAX: u64 = u32::MAX as u64;

    #[test]
    fn bools() {
        for text in ["1", "y", "Yes", "t", "True\n", "on", "ON"] {
            assert!(parse_bool(text).unwrap(), "{}", text);
        }
        for text in ["0", "n", "No", "f", "false", "off", "OF"] {
            assert!(!parse_bool(text).unwrap(), "{}", text);
        }
        for text in ["", "2", "o", "ox", " 1", "maybe"] {
            assert!(matches!(parse_bool(text), Err(Error::InvalidValue)), "{}", text);
        }
    }

    #[test]
    fn decimal() {
        assert_eq!(parse_unsigned("0", U8_MAX).unwrap(), 0);
        assert_eq!(parse_unsigned("255", U8_MAX).unwrap(), 255);
        assert_eq!(parse_unsigned("+17\n", U8_MAX).unwrap(), 17);
        assert_eq!(parse_unsigned("4294967295", U32_MAX).unwrap(), u32::MAX);
    }

    #[test]
    fn prefixed() {
        assert_eq!(parse_unsigned("0x55", U8_MAX).unwrap(), 0x55);
        assert_eq!(parse_unsigned("0XfF\n", U8_MAX).unwrap(), 0xff);
        assert_eq!(parse_unsigned("017", U8_MAX).unwrap(), 0o17);
        assert!(matches!(parse_unsigned("08", U8_MAX), Err(Error::InvalidValue)));
        assert!(matches!(parse_unsigned("0x", U8_MAX), Err(Error::InvalidValue)));
    }

    #[test]
    fn invalid() {
        for text in ["", "\n", "-1", "12a", "1\n\n", " 1", "+"] {
            assert!(
                matches!(parse_unsigned(text, U8_MAX), Err(Error::InvalidValue)),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn out_of_range() {
        assert!(matches!(parse_unsigned("256", U8_MAX), Err(Error::OutOfRange)));
        assert!(matches!(
            parse_unsigned("4294967296", U32_MAX),
            Err(Error::OutOfRange)
        ));
        assert!(matches!(
            parse_unsigned("99999999999999999999999", U32_MAX),
            Err(Error::OutOfRange)
        ));
    }
}
