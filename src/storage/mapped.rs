//! Memory-mapped external RAM bank.
#![allow(unsafe_code)]

use super::{Error, ReadStorage, Storage};
use core::ptr;

/// A region living at a fixed bus address, accessed with volatile loads and
/// stores so every byte really reaches the memory controller.
#[derive(Debug)]
pub struct MappedRegion {
    base: *mut u8,
    len: usize,
}

impl MappedRegion {
    /// Create a region over `len` bytes starting at `base`.
    ///
    /// # Safety
    ///
    /// `base..base + len` must be valid for reads and writes of `u8` for the
    /// whole lifetime of the returned value, the memory controller must
    /// already be initialised, and nothing else may access the range while
    /// this value exists.
    pub unsafe fn new(base: *mut u8, len: usize) -> Self {
        Self { base, len }
    }

    /// Bus address of the first byte.
    pub fn base(&self) -> *mut u8 {
        self.base
    }

    fn check(&self, offset: u32, len: usize) -> Result<usize, Error> {
        let start = offset as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.len => Ok(start),
            _ => Err(Error::OutOfBounds),
        }
    }
}

impl ReadStorage for MappedRegion {
    type Error = Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = self.check(offset, bytes.len())?;
        for (i, byte) in bytes.iter_mut().enumerate() {
            // SAFETY: bounds checked above, validity guaranteed by `new`.
            *byte = unsafe { ptr::read_volatile(self.base.add(start + i)) };
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.len
    }
}

impl Storage for MappedRegion {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = self.check(offset, bytes.len())?;
        for (i, byte) in bytes.iter().enumerate() {
            // SAFETY: bounds checked above, validity guaranteed by `new`.
            unsafe { ptr::write_volatile(self.base.add(start + i), *byte) };
        }
        Ok(())
    }
}
