use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use tracing::warn;

use super::DeviceState;
use crate::registers::REGISTER_SIZE;

/// An open handle to a device's register window.
///
/// `DeviceFile` is returned by [`Device::open`]. See the [module-level
/// documentation] for the access rules.
///
/// [`Device::open`]: super::Device::open
/// [module-level documentation]: super
pub struct DeviceFile {
    state: Arc<DeviceState>,
    pos: u64,
}

impl fmt::Debug for DeviceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceFile")
            .field("device", &self.state.name())
            .field("pos", &self.pos)
            .finish()
    }
}

enum Access {
    // Position is valid and the buffer holds at least one register
    Register(usize),
    // Nothing to transfer
    None,
}

impl DeviceFile {
    pub(crate) fn new(state: Arc<DeviceState>) -> DeviceFile {
        DeviceFile { state, pos: 0 }
    }

    /// Returns the current byte offset.
    pub fn position(&self) -> u64 {
        self.pos
    }

    fn check_access(&self, op: &str, len: usize) -> io::Result<Access> {
        if self.pos >= self.state.span() as u64 {
            return Ok(Access::None);
        }

        if self.pos % REGISTER_SIZE as u64 != 0 {
            warn!(
                device = self.state.name(),
                offset = self.pos,
                "{}: unaligned access",
                op
            );
            return Err(errno!(libc::EFAULT));
        }

        if len == 0 {
            return Ok(Access::None);
        }

        if len < REGISTER_SIZE {
            warn!(
                device = self.state.name(),
                len,
                "{}: buffer smaller than a register",
                op
            );
            return Err(errno!(libc::EINVAL));
        }

        Ok(Access::Register(self.pos as usize))
    }
}

impl Read for DeviceFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let offset = match self.check_access("read", buf.len())? {
            Access::Register(offset) => offset,
            Access::None => return Ok(0),
        };

        let value = self.state.read(offset);
        buf[..REGISTER_SIZE].copy_from_slice(&value.to_ne_bytes());
        self.pos += REGISTER_SIZE as u64;

        Ok(REGISTER_SIZE)
    }
}

impl Write for DeviceFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let offset = match self.check_access("write", buf.len())? {
            Access::Register(offset) => offset,
            Access::None => return Ok(0),
        };

        let mut word = [0u8; REGISTER_SIZE];
        word.copy_from_slice(&buf[..REGISTER_SIZE]);

        let guard = self.state.lock();
        self.state.write(&guard, offset, u32::from_ne_bytes(word));
        drop(guard);

        self.pos += REGISTER_SIZE as u64;

        Ok(REGISTER_SIZE)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for DeviceFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => (self.state.span() as u64).checked_add_signed(delta),
        };

        // File offsets are signed, so anything above i64::MAX is negative
        match new_pos.filter(|&p| i64::try_from(p).is_ok()) {
            Some(new_pos) => {
                self.pos = new_pos;
                Ok(new_pos)
            }
            None => Err(errno!(libc::EINVAL)),
        }
    }
}
