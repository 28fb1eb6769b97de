//! Conversion between 32-bit fixed-point register words and decimal text.
//!
//! A register word on its own is meaningless. It's interpreted through a
//! [`Format`], which holds the number of fractional bits (0-31) and whether
//! the word is a two's-complement signed value. Every conversion takes the
//! format explicitly.
//!
//! ## Encoding
//!
//! [`encode`] produces an integer part, a decimal point and exactly
//! [`FRACTIONAL_DIGITS`] fractional digits. The fractional digits are generated
//! by a long-division style expansion in integer arithmetic. Before expanding,
//! the least significant fractional bit is dropped, so the output can trail the
//! exact value by up to one part in 2<sup>F</sup>. Existing tooling parses
//! these strings, so the behavior is kept as is.
//!
//! A signed word with only the sign bit set (`0x8000_0000`) has no positive
//! counterpart. It's rendered as `-0.000000000`.
//!
//! ## Decoding
//!
//! [`decode`] strips commas, spaces, carriage returns and line feeds, and stops
//! at the first NUL. The remaining text must be an optional leading `-`,
//! digits, and at most one `.`. Fractional digits past the ninth are ignored.
//! The fraction is converted to binary by repeated doubling, which never sets
//! the least significant bit of a word with one or more fractional bits.
//!
//! Integer parts that don't fit the format are rejected by default.
//! [`Overflow::Wrap`] keeps the low 32 bits instead, matching the kernel
//! drivers this codec was first written for.
//!
//! ## Examples
//!
//! ```
//! use fixedreg::fixed::{self, Format};
//!
//! # fn main() -> fixedreg::fixed::Result<()> {
//! let word = fixed::decode("-2.5", 16, true)?;
//! assert_eq!(word, 0xfffd_8000);
//! assert_eq!(fixed::encode(word, 16, true)?, "-2.500000000");
//!
//! let format = Format::unsigned(4)?;
//! assert_eq!(format.to_string(), "UQ28.4");
//! # Ok(())
//! # }
//! ```

use std::error;
use std::fmt;
use std::result;

mod decode;
mod encode;

pub use self::decode::{decode_bytes, decode_with};
pub use self::encode::encode_with;

/// Number of decimal digits written after, and read after, the decimal point.
pub const FRACTIONAL_DIGITS: usize = 9;

/// Size of the scratch buffer that holds the stripped decimal text.
pub const SCRATCH_CAPACITY: usize = 80;

/// Maximum length of the decimal text after separators are stripped.
///
/// One byte of the scratch buffer is reserved for the terminator.
pub const MAX_INPUT_LEN: usize = SCRATCH_CAPACITY - 1;

/// Maximum number of fractional bits in a 32-bit word.
pub const MAX_FRACTIONAL_BITS: u8 = 31;

pub(crate) const SIGN_BIT: u32 = 0x8000_0000;

/// Errors that can occur when converting fixed-point values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The number of fractional bits is larger than 31.
    InvalidFractionalBits(u8),
    /// The decimal text is longer than [`MAX_INPUT_LEN`] after separators
    /// were stripped.
    ///
    /// Decoding stops at the first character past the limit, so `len` is
    /// always `max + 1`.
    InputTooLong { len: usize, max: usize },
    /// The decimal text contains a character that isn't a digit, a single
    /// decimal point, a leading minus sign or a separator.
    ///
    /// `index` is the position in the stripped text.
    InvalidCharacter { index: usize, character: char },
    /// The decimal text doesn't contain any digits.
    NoDigits,
    /// The decoded value doesn't fit in the format.
    Overflow { format: Format },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::InvalidFractionalBits(bits) => {
                write!(f, "Invalid number of fractional bits: {} (max 31)", bits)
            }
            Error::InputTooLong { len, max } => {
                write!(f, "Input too long: {} characters (max {})", len, max)
            }
            Error::InvalidCharacter { index, character } => {
                write!(f, "Invalid character {:?} at position {}", character, index)
            }
            Error::NoDigits => write!(f, "No digits found"),
            Error::Overflow { format } => write!(f, "Value doesn't fit in {}", format),
        }
    }
}

impl error::Error for Error {}

/// Result type returned from methods that can have `fixedreg::fixed::Error`s.
pub type Result<T> = result::Result<T, Error>;

/// Interpretation of a 32-bit register word.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct Format {
    fractional_bits: u8,
    signed: bool,
}

impl Format {
    /// Constructs a new `Format`.
    ///
    /// Returns `Err(`[`Error::InvalidFractionalBits`]`)` if `fractional_bits`
    /// is larger than 31.
    pub fn new(fractional_bits: u8, signed: bool) -> Result<Format> {
        if fractional_bits > MAX_FRACTIONAL_BITS {
            return Err(Error::InvalidFractionalBits(fractional_bits));
        }

        Ok(Format {
            fractional_bits,
            signed,
        })
    }

    // For formats known to be valid at compile time
    pub(crate) const fn new_unchecked(fractional_bits: u8, signed: bool) -> Format {
        Format {
            fractional_bits,
            signed,
        }
    }

    /// Constructs an unsigned `Format`.
    pub fn unsigned(fractional_bits: u8) -> Result<Format> {
        Format::new(fractional_bits, false)
    }

    /// Constructs a two's-complement signed `Format`.
    pub fn signed(fractional_bits: u8) -> Result<Format> {
        Format::new(fractional_bits, true)
    }

    /// Returns the number of fractional bits.
    pub fn fractional_bits(&self) -> u8 {
        self.fractional_bits
    }

    /// Returns `true` if words are interpreted as two's-complement signed values.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns the number of integer bits, including the sign bit.
    pub fn integer_bits(&self) -> u8 {
        32 - self.fractional_bits
    }

    // All-ones mask covering the fractional bits
    pub(crate) fn fraction_mask(&self) -> u32 {
        mask(self.fractional_bits)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.signed {
            write!(f, "Q{}.{}", self.integer_bits() - 1, self.fractional_bits)
        } else {
            write!(f, "UQ{}.{}", self.integer_bits(), self.fractional_bits)
        }
    }
}

// Mask with the lowest `bits` bits set. `bits` is at most 31.
pub(crate) fn mask(bits: u8) -> u32 {
    (1u32 << bits) - 1
}

/// Options for [`encode_with`].
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub struct EncodeOptions {
    /// Append a line feed, the way register attributes are read from sysfs.
    pub newline: bool,
}

impl EncodeOptions {
    /// Returns options that append a trailing line feed.
    pub fn with_newline() -> EncodeOptions {
        EncodeOptions { newline: true }
    }
}

/// How [`decode_with`] handles values that don't fit in the format.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum Overflow {
    /// Return `Err(`[`Error::Overflow`]`)`.
    #[default]
    Error,
    /// Keep the low 32 bits, and ignore a minus sign when the format is unsigned.
    Wrap,
}

/// Options for [`decode_with`].
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub struct DecodeOptions {
    pub overflow: Overflow,
}

impl DecodeOptions {
    /// Returns options that wrap out-of-range values instead of rejecting them.
    pub fn wrapping() -> DecodeOptions {
        DecodeOptions {
            overflow: Overflow::Wrap,
        }
    }
}

/// Converts a fixed-point word to decimal text with nine fractional digits.
///
/// Returns `Err(`[`Error::InvalidFractionalBits`]`)` if `fractional_bits`
/// is larger than 31.
pub fn encode(value: u32, fractional_bits: u8, is_signed: bool) -> Result<String> {
    let format = Format::new(fractional_bits, is_signed)?;

    Ok(encode_with(value, format, &EncodeOptions::default()))
}

/// Converts decimal text to a fixed-point word.
///
/// Out-of-range values are rejected. Use [`decode_with`] to select a
/// different [`Overflow`] policy.
pub fn decode(text: &str, fractional_bits: u8, is_signed: bool) -> Result<u32> {
    let format = Format::new(fractional_bits, is_signed)?;

    decode_with(text, format, &DecodeOptions::default())
}

/// A register word paired with its [`Format`].
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct FixedPoint {
    raw: u32,
    format: Format,
}

impl FixedPoint {
    /// Constructs a new `FixedPoint` from a raw register word.
    pub fn new(raw: u32, format: Format) -> FixedPoint {
        FixedPoint { raw, format }
    }

    /// Parses decimal text using the default [`DecodeOptions`].
    pub fn parse(text: &str, format: Format) -> Result<FixedPoint> {
        let raw = decode_with(text, format, &DecodeOptions::default())?;

        Ok(FixedPoint { raw, format })
    }

    /// Returns the raw register word.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Returns the format.
    pub fn format(&self) -> Format {
        self.format
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_with(
            self.raw,
            self.format,
            &EncodeOptions::default(),
        ))
    }
}
