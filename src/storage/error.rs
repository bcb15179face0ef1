//! Common error types for storage operations

/// A common error type for storage operations.
///
/// Kept small and `Copy` so it can travel through the diagnostic engine and
/// the shell without allocation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An access touched an offset outside `[0, capacity)`.
    OutOfBounds,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::OutOfBounds => defmt::write!(f, "OutOfBounds"),
        }
    }
}
