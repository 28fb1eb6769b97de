use std::sync::atomic::{AtomicU32, Ordering};

use super::{check_offset, check_span, Registers, Result, REGISTER_SIZE};

/// Register window kept in process memory.
///
/// All registers start out as zero.
#[derive(Debug)]
pub struct RegisterBank {
    words: Box<[AtomicU32]>,
}

impl RegisterBank {
    /// Constructs a new `RegisterBank` spanning `span` bytes.
    ///
    /// Returns `Err(`[`Error::InvalidSpan`]`)` if `span` is zero or not a
    /// multiple of 4.
    ///
    /// [`Error::InvalidSpan`]: super::Error::InvalidSpan
    pub fn new(span: usize) -> Result<RegisterBank> {
        check_span(span)?;

        let words = (0..span / REGISTER_SIZE).map(|_| AtomicU32::new(0)).collect();

        Ok(RegisterBank { words })
    }
}

impl Registers for RegisterBank {
    fn span(&self) -> usize {
        self.words.len() * REGISTER_SIZE
    }

    fn read(&self, offset: usize) -> u32 {
        check_offset(offset, self.span());
        self.words[offset / REGISTER_SIZE].load(Ordering::SeqCst)
    }

    fn write(&self, offset: usize, value: u32) {
        check_offset(offset, self.span());
        self.words[offset / REGISTER_SIZE].store(value, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Error;

    #[test]
    fn starts_zeroed() {
        let bank = RegisterBank::new(0x10).unwrap();

        assert_eq!(bank.span(), 0x10);
        for offset in (0..0x10).step_by(REGISTER_SIZE) {
            assert_eq!(bank.read(offset), 0);
        }
    }

    #[test]
    fn read_back() {
        let bank = RegisterBank::new(0x10).unwrap();

        bank.write(0x8, 0x55);
        bank.write(0xc, 0xdead_beef);

        assert_eq!(bank.read(0x0), 0);
        assert_eq!(bank.read(0x8), 0x55);
        assert_eq!(bank.read(0xc), 0xdead_beef);
    }

    #[test]
    fn invalid_span() {
        assert!(matches!(RegisterBank::new(0), Err(Error::InvalidSpan(0))));
        assert!(matches!(RegisterBank::new(6), Err(Error::InvalidSpan(6))));
    }

    #[test]
    #[should_panic]
    fn out_of_range() {
        RegisterBank::new(0x10).unwrap().read(0x10);
    }

    #[test]
    #[should_panic]
    fn unaligned() {
        RegisterBank::new(0x10).unwrap().write(0x2, 1);
    }
}
