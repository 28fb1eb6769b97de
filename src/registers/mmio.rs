// Copyright (c) 2017-2019 Rene van der Meer
//
// Permission is hereby granted, free of charge, to any person obtaining a
// copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
// THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr;

use libc::{self, c_void, off_t, size_t, MAP_FAILED, MAP_SHARED, O_SYNC, PROT_READ, PROT_WRITE};
use tracing::debug;

use super::{check_offset, check_span, Error, Registers, Result};

/// Memory-mapped register window.
///
/// The mapping is released when `Mmio` goes out of scope.
pub struct Mmio {
    // Start of the mapping, which is page-aligned
    map_ptr: *mut c_void,
    map_len: usize,
    // First register of the window, inside the mapping
    mem_ptr: *mut u32,
    span: usize,
}

impl fmt::Debug for Mmio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mmio")
            .field("mem_ptr", &self.mem_ptr)
            .field("span", &self.span)
            .finish()
    }
}

impl Mmio {
    /// Maps `span` bytes of `path`, starting at byte `offset`.
    ///
    /// For `/dev/mem`, `offset` is the physical base address of the component.
    /// UIO nodes expose their first memory region at offset 0. The offset
    /// must be 32-bit aligned, but doesn't need to be page-aligned.
    pub fn open<P: AsRef<Path>>(path: P, offset: u64, span: usize) -> Result<Mmio> {
        check_span(span)?;
        if offset % super::REGISTER_SIZE as u64 != 0 {
            return Err(Error::InvalidOffset(offset));
        }

        let path = path.as_ref();

        // O_SYNC disables caching on /dev/mem mappings
        let mem_file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(O_SYNC)
            .open(path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::PermissionDenied {
                    Error::PermissionDenied(path.display().to_string())
                } else {
                    Error::Io(e)
                }
            })?;

        // mmap only accepts page-aligned offsets
        let page_size = parse_retval!(unsafe { libc::sysconf(libc::_SC_PAGESIZE) })? as u64;
        let map_offset = offset & !(page_size - 1);
        let delta = (offset - map_offset) as usize;
        let map_len = delta + span;

        let map_ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                map_len,
                PROT_READ | PROT_WRITE,
                MAP_SHARED,
                mem_file.as_raw_fd(),
                map_offset as off_t,
            )
        };

        if map_ptr == MAP_FAILED {
            return Err(Error::Io(io::Error::last_os_error()));
        }

        debug!(
            path = %path.display(),
            offset = format_args!("{:#x}", offset),
            span = format_args!("{:#x}", span),
            "mapped register window"
        );

        // The mapping stays valid after the file is closed
        let mem_ptr = unsafe { (map_ptr as *mut u8).add(delta) } as *mut u32;

        Ok(Mmio {
            map_ptr,
            map_len,
            mem_ptr,
            span,
        })
    }
}

impl Registers for Mmio {
    fn span(&self) -> usize {
        self.span
    }

    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        check_offset(offset, self.span);
        unsafe { ptr::read_volatile(self.mem_ptr.add(offset / super::REGISTER_SIZE)) }
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        check_offset(offset, self.span);
        unsafe {
            ptr::write_volatile(self.mem_ptr.add(offset / super::REGISTER_SIZE), value);
        }
    }
}

impl Drop for Mmio {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.map_ptr, self.map_len as size_t);
        }
    }
}

// Required because of the raw pointer to our memory-mapped file
unsafe impl Send for Mmio {}
unsafe impl Sync for Mmio {}
