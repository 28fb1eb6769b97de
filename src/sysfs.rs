//! Client for register attributes exported by a kernel platform driver.
//!
//! When the `hps_led_patterns` kernel driver (or a driver built the same way)
//! is loaded, every register is available as a text file in the device's sysfs
//! directory, e.g. `/sys/bus/platform/drivers/hps_led_patterns/ff200000.hps_led_patterns/`.
//! [`SysfsDevice`] reads and writes those files, and converts fixed-point
//! attributes with the [`fixed`] codec.
//!
//! [`fixed`]: crate::fixed

use std::error;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::result;

use tracing::debug;

use crate::fixed::{self, DecodeOptions, EncodeOptions, FixedPoint, Format};

const PLATFORM_DRIVERS: &str = "/sys/bus/platform/drivers";

// Files in a driver directory that aren't bound devices
const DRIVER_FILES: [&str; 6] = ["bind", "unbind", "uevent", "module", "new_id", "remove_id"];

/// Errors that can occur when accessing sysfs attributes.
#[derive(Debug)]
pub enum Error {
    /// No device is bound to the specified driver.
    NotFound(String),
    /// The contents of an attribute can't be parsed.
    Parse(String),
    /// A fixed-point attribute can't be converted.
    Fixed(fixed::Error),
    /// I/O error.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::NotFound(ref driver) => write!(f, "No device bound to driver {}", driver),
            Error::Parse(ref text) => write!(f, "Can't parse attribute value: {:?}", text),
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

/// Result type returned from methods that can have `fixedreg::sysfs::Error`s.
pub type Result<T> = result::Result<T, Error>;

/// A device directory in sysfs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsDevice {
    dir: PathBuf,
}

impl SysfsDevice {
    /// Constructs a new `SysfsDevice` for the specified device directory.
    pub fn new<P: Into<PathBuf>>(dir: P) -> SysfsDevice {
        SysfsDevice { dir: dir.into() }
    }

    /// Returns the first device bound to the specified platform driver.
    pub fn find(driver: &str) -> Result<SysfsDevice> {
        find_in(Path::new(PLATFORM_DRIVERS), driver)
    }

    /// Returns the device directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Returns the raw contents of an attribute.
    pub fn read(&self, attr: &str) -> Result<String> {
        Ok(fs::read_to_string(self.dir.join(attr))?)
    }

    /// Writes `text` to an attribute.
    pub fn write(&self, attr: &str, text: &str) -> Result<()> {
        debug!(device = %self.dir.display(), attribute = attr, text, "writing attribute");

        File::create(self.dir.join(attr))?.write_all(text.as_bytes())?;

        Ok(())
    }

    /// Reads a boolean attribute.
    pub fn read_bool(&self, attr: &str) -> Result<bool> {
        Ok(self.read_u32(attr)? != 0)
    }

    /// Writes a boolean attribute as `0` or `1`.
    pub fn write_bool(&self, attr: &str, value: bool) -> Result<()> {
        self.write(attr, if value { "1" } else { "0" })
    }

    /// Reads an unsigned decimal attribute.
    pub fn read_u32(&self, attr: &str) -> Result<u32> {
        let text = self.read(attr)?;

        text.trim().parse().map_err(|_| Error::Parse(text))
    }

    /// Writes an unsigned decimal attribute.
    pub fn write_u32(&self, attr: &str, value: u32) -> Result<()> {
        self.write(attr, &value.to_string())
    }

    /// Reads a fixed-point attribute, and converts it back to a register word.
    ///
    /// The attribute's text has already lost the lowest fractional bit, so
    /// the result may differ from the register's contents in that bit.
    pub fn read_fixed(&self, attr: &str, format: Format) -> Result<FixedPoint> {
        let text = self.read(attr)?;
        let raw = fixed::decode_with(&text, format, &DecodeOptions::default())?;

        Ok(FixedPoint::new(raw, format))
    }

    /// Writes a fixed-point attribute as decimal text.
    pub fn write_fixed(&self, attr: &str, value: FixedPoint) -> Result<()> {
        let text = fixed::encode_with(value.raw(), value.format(), &EncodeOptions::default());

        self.write(attr, &text)
    }
}

fn find_in(root: &Path, driver: &str) -> Result<SysfsDevice> {
    let driver_dir = root.join(driver);
    let entries = match fs::read_dir(&driver_dir) {
        Ok(entries) => entries,
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NotFound(driver.to_owned()))
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let mut devices = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();

        if DRIVER_FILES.iter().any(|f| name == *f) {
            continue;
        }

        // Bound devices are symlinks to directories
        if entry.path().is_dir() {
            devices.push(entry.path());
        }
    }

    devices.sort();
    devices
        .into_iter()
        .next()
        .map(SysfsDevice::new)
        .ok_or_else(|| Error::NotFound(driver.to_owned()))
}
