//! Error types for the memory diagnostic engine

use super::controller::{Mode, Target};
use crate::storage;

/// The first byte that did not hold the expected pattern value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Offset from the start of the region.
    pub offset: u32,
    /// Pattern byte that should have been there.
    pub expected: u8,
    /// Byte actually read back.
    pub actual: u8,
}

/// Errors reported by diagnostic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The region rejected an access.
    Storage(storage::Error),
    /// Verification found a byte that differs from the pattern.
    Mismatch(Mismatch),
    /// The controller finished the command but reports another mode.
    NotConfirmed {
        /// Requested mode.
        target: Target,
        /// Mode reported after the busy flag cleared.
        actual: Mode,
    },
    /// The busy flag did not clear within the configured poll limit.
    Timeout,
}

impl From<storage::Error> for Error {
    fn from(err: storage::Error) -> Self {
        Error::Storage(err)
    }
}

impl From<Mismatch> for Error {
    fn from(mismatch: Mismatch) -> Self {
        Error::Mismatch(mismatch)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Mismatch {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Mismatch {{ offset: {=u32}, expected: {=u8}, actual: {=u8} }}",
            self.offset,
            self.expected,
            self.actual
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Storage(err) => defmt::write!(f, "Storage({})", err),
            Error::Mismatch(m) => defmt::write!(f, "Mismatch({})", m),
            Error::NotConfirmed { target, .. } => {
                defmt::write!(f, "NotConfirmed({=str})", target.name())
            }
            Error::Timeout => defmt::write!(f, "Timeout"),
        }
    }
}
