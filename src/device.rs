//! Register-backed control surface for FPGA components.
//!
//! A platform driver for a soft-IP component typically exposes the component's
//! registers in two ways. Each register is exported as a text attribute in
//! sysfs, and the whole register window is exposed as a misc character device
//! that reads and writes raw 32-bit words at byte offsets. [`Device`] provides
//! both on top of any [`Registers`] implementation.
//!
//! ## Attributes
//!
//! Attributes are read with [`Device::show`] and written with
//! [`Device::store`]. The text format depends on the attribute's [`Kind`].
//!
//! * [`Kind::Bool`] reads as `0` or `1`, and accepts `y`, `t`, `1`, `on`
//!   or `n`, `f`, `0`, `off` (case-insensitive, only the leading characters
//!   are checked).
//! * [`Kind::U8`] and [`Kind::U32`] read as decimal numbers, and accept
//!   decimal, hexadecimal (`0x` prefix) or octal (leading `0`) numbers.
//! * [`Kind::Fixed`] reads and writes decimal text through the [`fixed`] codec.
//!
//! Every value read ends with a line feed.
//!
//! ## Character device
//!
//! [`Device::open`] returns a [`DeviceFile`], which implements [`Read`],
//! [`Write`] and [`Seek`]. Each call transfers exactly one register at the
//! current position, and advances the position by 4 bytes. Accesses at or past
//! the end of the register window transfer nothing. Accesses at an offset that
//! isn't 32-bit aligned fail with `EFAULT`.
//!
//! Writes through either interface are serialized by a lock owned by the
//! `Device`. Reads aren't.
//!
//! ## Examples
//!
//! ```
//! use std::io::{Read, Seek, SeekFrom};
//!
//! use fixedreg::device::{Attribute, Device, Kind};
//! use fixedreg::fixed::Format;
//! use fixedreg::registers::RegisterBank;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registers = RegisterBank::new(0x8)?;
//! let device = Device::new(
//!     "gain",
//!     Box::new(registers),
//!     vec![Attribute::new("gain", 0x4, Kind::Fixed(Format::signed(16)?))],
//! );
//!
//! device.store("gain", "-0.5\n")?;
//! assert_eq!(device.show("gain")?, "-0.500000000\n");
//!
//! let mut file = device.open();
//! let mut word = [0u8; 4];
//! file.seek(SeekFrom::Start(0x4))?;
//! file.read_exact(&mut word)?;
//! assert_eq!(u32::from_ne_bytes(word), 0xffff_8000);
//! # Ok(())
//! # }
//! ```
//!
//! [`Registers`]: crate::registers::Registers
//! [`fixed`]: crate::fixed
//! [`Read`]: std::io::Read
//! [`Write`]: std::io::Write
//! [`Seek`]: std::io::Seek

use std::error;
use std::fmt;
use std::io;
use std::result;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::fixed::{self, DecodeOptions, EncodeOptions, Format};
use crate::registers::{Registers, REGISTER_SIZE};

mod file;
mod parse;

pub use self::file::DeviceFile;

/// Errors that can occur when accessing a device's attributes.
#[derive(Debug)]
pub enum Error {
    /// The device doesn't have an attribute with the specified name.
    UnknownAttribute(String),
    /// The text written to an attribute can't be parsed (`EINVAL`).
    InvalidValue,
    /// The number written to an attribute doesn't fit in the register (`ERANGE`).
    OutOfRange,
    /// The text written to a fixed-point attribute can't be converted.
    Fixed(fixed::Error),
    /// I/O error.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::UnknownAttribute(ref name) => write!(f, "Unknown attribute: {}", name),
            Error::InvalidValue => write!(f, "Invalid value"),
            Error::OutOfRange => write!(f, "Value out of range"),
            Error::Fixed(ref err) => write!(f, "Fixed-point error: {}", err),
            Error::Io(ref err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<fixed::Error> for Error {
    fn from(err: fixed::Error) -> Error {
        Error::Fixed(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(e) => e,
            Error::UnknownAttribute(_) => io::Error::new(io::ErrorKind::NotFound, err),
            Error::OutOfRange => errno!(libc::ERANGE),
            _ => io::Error::new(io::ErrorKind::InvalidInput, err),
        }
    }
}

/// Result type returned from methods that can have `fixedreg::device::Error`s.
pub type Result<T> = result::Result<T, Error>;

/// Attribute value types.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Kind {
    /// Register holds 0 or 1.
    Bool,
    /// Register holds an 8-bit value in its low byte.
    U8,
    /// Register holds a 32-bit value.
    U32,
    /// Register holds a fixed-point value.
    Fixed(Format),
}

/// A register exported as a text attribute.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Attribute {
    name: String,
    offset: usize,
    kind: Kind,
}

impl Attribute {
    /// Constructs a new `Attribute` for the register at byte offset `offset`.
    pub fn new<S: Into<String>>(name: S, offset: usize, kind: Kind) -> Attribute {
        Attribute {
            name: name.into(),
            offset,
            kind,
        }
    }

    /// Returns the attribute's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the register's byte offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the attribute's value type.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    fn format(&self, value: u32) -> String {
        match self.kind {
            Kind::Bool => format!("{}\n", u8::from(value != 0)),
            Kind::U8 => format!("{}\n", value as u8),
            Kind::U32 => format!("{}\n", value),
            Kind::Fixed(format) => fixed::encode_with(value, format, &EncodeOptions::with_newline()),
        }
    }

    fn parse(&self, text: &str) -> Result<u32> {
        match self.kind {
            Kind::Bool => parse::parse_bool(text).map(u32::from),
            Kind::U8 => parse::parse_unsigned(text, u64::from(u8::MAX)),
            Kind::U32 => parse::parse_unsigned(text, u64::from(u32::MAX)),
            Kind::Fixed(format) => {
                Ok(fixed::decode_with(text, format, &DecodeOptions::default())?)
            }
        }
    }
}

// Shared between a Device and its open files
pub(crate) struct DeviceState {
    name: String,
    registers: Box<dyn Registers>,
    attributes: Vec<Attribute>,
    lock: Mutex<()>,
}

impl fmt::Debug for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceState")
            .field("name", &self.name)
            .field("registers", &self.registers)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl DeviceState {
    pub(crate) fn span(&self) -> usize {
        self.registers.span()
    }

    pub(crate) fn read(&self, offset: usize) -> u32 {
        self.registers.read(offset)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    // A writer that panicked can't leave a register half-written, so a
    // poisoned lock is still usable.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn write(&self, _guard: &MutexGuard<'_, ()>, offset: usize, value: u32) {
        self.registers.write(offset, value);
    }
}

/// A register window with its text attributes.
///
/// `Device` is cheap to clone. Clones share the same registers and write lock.
#[derive(Clone, Debug)]
pub struct Device {
    inner: Arc<DeviceState>,
}

impl Device {
    /// Constructs a new `Device`.
    ///
    /// # Panics
    ///
    /// Panics if an attribute's offset is unaligned or outside of the
    /// register window.
    pub fn new<S: Into<String>>(
        name: S,
        registers: Box<dyn Registers>,
        attributes: Vec<Attribute>,
    ) -> Device {
        let span = registers.span();
        for attr in &attributes {
            assert!(
                attr.offset % REGISTER_SIZE == 0 && attr.offset < span,
                "attribute {} at invalid offset {:#x}",
                attr.name,
                attr.offset
            );
        }

        Device {
            inner: Arc::new(DeviceState {
                name: name.into(),
                registers,
                attributes,
                lock: Mutex::new(()),
            }),
        }
    }

    /// Returns the device name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the size of the register window in bytes.
    pub fn span(&self) -> usize {
        self.inner.span()
    }

    /// Returns the device's attributes.
    pub fn attributes(&self) -> &[Attribute] {
        &self.inner.attributes
    }

    /// Returns the attribute with the specified name.
    pub fn attribute(&self, name: &str) -> Result<&Attribute> {
        self.inner
            .attributes
            .iter()
            .find(|attr| attr.name == name)
            .ok_or_else(|| Error::UnknownAttribute(name.to_owned()))
    }

    /// Reads an attribute, and returns its value as text.
    pub fn show(&self, name: &str) -> Result<String> {
        let attr = self.attribute(name)?;

        Ok(attr.format(self.inner.read(attr.offset)))
    }

    /// Parses `text`, and writes the result to an attribute's register.
    ///
    /// Returns the number of bytes consumed, which is always the length of `text`.
    pub fn store(&self, name: &str, text: &str) -> Result<usize> {
        let attr = self.attribute(name)?;
        let value = attr.parse(text)?;

        let guard = self.inner.lock();
        self.inner.write(&guard, attr.offset, value);

        debug!(
            device = %self.inner.name,
            attribute = name,
            value = format_args!("{:#010x}", value),
            "stored attribute"
        );

        Ok(text.len())
    }

    /// Opens the register window as a file.
    ///
    /// Every `DeviceFile` keeps its own position, which starts at 0.
    pub fn open(&self) -> DeviceFile {
        DeviceFile::new(self.inner.clone())
    }
}
