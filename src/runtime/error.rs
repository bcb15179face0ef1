//! Common error types for runtime operations

/// Errors reported by the task runtime.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The working area for a new task could not be allocated.
    OutOfMemory,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::OutOfMemory => defmt::write!(f, "OutOfMemory"),
        }
    }
}
