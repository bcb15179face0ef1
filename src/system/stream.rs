//! Byte stream a shell session talks over.

use core::fmt;

/// Blocking byte source, typically a serial port.
pub trait Read {
    /// Associated error type
    type Error: fmt::Debug;

    /// Block until at least one byte is available and copy up to
    /// `buf.len()` bytes into `buf`. Returning `Ok(0)` signals that the
    /// stream has closed.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// A bidirectional stream: blocking reads, formatted writes.
pub trait Stream: Read + fmt::Write {}

impl<T: Read + fmt::Write> Stream for T {}
