//! # Byte-addressed memory regions
//!
//! The diagnostic engine never touches memory directly. It goes through the
//! traits in this module, which model a single contiguous region of fixed
//! capacity accessed with byte offsets:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │   Diagnostic    │───▶│  ReadStorage /  │
//! │     Engine      │    │  Storage        │
//! └─────────────────┘    └─────────────────┘
//!                                 │
//!               ┌─────────────────┴─────────────────┐
//!               ▼                                   ▼
//!     ┌─────────────────┐                 ┌─────────────────┐
//!     │  SliceRegion    │                 │  MappedRegion   │
//!     │  (RAM buffer)   │                 │  (SDRAM bank)   │
//!     └─────────────────┘                 └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use sdramdiag::storage::{ReadStorage, SliceRegion, Storage};
//!
//! let mut backing = [0u8; 64];
//! let mut region = SliceRegion::new(&mut backing);
//!
//! region.write_byte(3, 0xA5).unwrap();
//! assert_eq!(region.read_byte(3).unwrap(), 0xA5);
//! assert!(region.write_byte(64, 0).is_err());
//! ```

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for storage operations
pub mod error;

mod mapped;

pub use error::Error;
pub use mapped::MappedRegion;

/// Trait for reading data from a memory region.
pub trait ReadStorage {
    /// Associated error type for read operations
    type Error: core::fmt::Debug;

    /// Read `bytes.len()` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// - `OutOfBounds` if `offset + bytes.len()` exceeds the capacity
    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error>;

    /// Total capacity of the region in bytes.
    fn capacity(&self) -> usize;

    /// Load a single byte.
    fn read_byte(&mut self, offset: u32) -> Result<u8, Self::Error> {
        let mut byte = [0u8; 1];
        self.read(offset, &mut byte)?;
        Ok(byte[0])
    }
}

/// Trait for memory regions that can also be written.
pub trait Storage: ReadStorage {
    /// Write `bytes` starting at `offset`.
    ///
    /// # Errors
    ///
    /// - `OutOfBounds` if `offset + bytes.len()` exceeds the capacity
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Store a single byte.
    fn write_byte(&mut self, offset: u32, byte: u8) -> Result<(), Self::Error> {
        self.write(offset, &[byte])
    }
}

/// A region backed by an ordinary mutable byte slice.
///
/// Used on hosts, in tests, and on targets where the external bank is already
/// exposed as a slice by the board support code.
#[derive(Debug)]
pub struct SliceRegion<'a> {
    memory: &'a mut [u8],
}

impl<'a> SliceRegion<'a> {
    /// Wrap a byte slice. The capacity is the slice length.
    pub fn new(memory: &'a mut [u8]) -> Self {
        Self { memory }
    }

    /// Read-only view of the whole region.
    pub fn as_slice(&self) -> &[u8] {
        self.memory
    }

    /// Mutable view of the whole region, bypassing the storage traits.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.memory
    }

    fn span(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, Error> {
        let start = offset as usize;
        let end = start.checked_add(len).ok_or(Error::OutOfBounds)?;
        if end > self.memory.len() {
            return Err(Error::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl ReadStorage for SliceRegion<'_> {
    type Error = Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let span = self.span(offset, bytes.len())?;
        bytes.copy_from_slice(&self.memory[span]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.memory.len()
    }

    fn read_byte(&mut self, offset: u32) -> Result<u8, Self::Error> {
        self.memory
            .get(offset as usize)
            .copied()
            .ok_or(Error::OutOfBounds)
    }
}

impl Storage for SliceRegion<'_> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let span = self.span(offset, bytes.len())?;
        self.memory[span].copy_from_slice(bytes);
        Ok(())
    }

    fn write_byte(&mut self, offset: u32, byte: u8) -> Result<(), Self::Error> {
        let slot = self
            .memory
            .get_mut(offset as usize)
            .ok_or(Error::OutOfBounds)?;
        *slot = byte;
        Ok(())
    }
}
