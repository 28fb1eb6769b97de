//! Access to 32-bit register windows.
//!
//! FPGA soft-IP components expose their control registers as a small
//! window of 32-bit words in the physical address space. [`Mmio`] maps such a
//! window from `/dev/mem`, a UIO device node (`/dev/uioN`), or any other file
//! that supports `mmap`. [`RegisterBank`] keeps the words in process memory,
//! which is useful when developing without the hardware attached.
//!
//! Both implement [`Registers`], which is what [`Device`] is built on.
//!
//! Offsets are byte offsets from the start of the window, and must be
//! 32-bit aligned.
//!
//! ## Troubleshooting
//!
//! ### Permission denied
//!
//! Mapping `/dev/mem` requires superuser privileges. UIO nodes can be made
//! accessible to a regular user through a `udev` rule. If [`Mmio::open`]
//! returns [`Error::PermissionDenied`], either run your application with
//! `sudo`, or change the permissions of the device node.
//!
//! [`Device`]: crate::device::Device

use std::error;
use std::fmt;
use std::io;
use std::result;

mod bank;
mod mmio;

pub use self::bank::RegisterBank;
pub use self::mmio::Mmio;

/// Size in bytes of a single register.
pub const REGISTER_SIZE: usize = std::mem::size_of::<u32>();

/// Errors that can occur when opening a register window.
#[derive(Debug)]
pub enum Error {
    /// Permission denied when opening the specified path for read/write access.
    PermissionDenied(String),
    /// The span is zero, or isn't a multiple of the register size.
    InvalidSpan(usize),
    /// The offset of the window isn't a multiple of the register size.
    InvalidOffset(u64),
    /// I/O error.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::PermissionDenied(ref path) => write!(f, "Permission denied: {}", path),
            Error::InvalidSpan(span) => write!(f, "Invalid register span: {:#x}", span),
            Error::InvalidOffset(offset) => write!(f, "Unaligned register offset: {:#x}", offset),
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

/// Result type returned from methods that can have `fixedreg::registers::Error`s.
pub type Result<T> = result::Result<T, Error>;

/// A window of 32-bit registers.
///
/// Implementations panic when `offset` points outside of the window. Callers
/// are expected to check offsets against [`span`] first.
///
/// [`span`]: Registers::span
pub trait Registers: fmt::Debug + Send + Sync {
    /// Returns the size of the window in bytes.
    fn span(&self) -> usize;
    /// Reads the register at byte offset `offset`.
    fn read(&self, offset: usize) -> u32;
    /// Writes `value` to the register at byte offset `offset`.
    fn write(&self, offset: usize, value: u32);
}

pub(crate) fn check_span(span: usize) -> Result<()> {
    if span == 0 || span % REGISTER_SIZE != 0 {
        return Err(Error::InvalidSpan(span));
    }

    Ok(())
}

#[inline]
pub(crate) fn check_offset(offset: usize, span: usize) {
    assert!(
        offset % REGISTER_SIZE == 0 && offset < span,
        "register offset {:#x} outside of {:#x} byte window",
        offset,
        span
    );
}
