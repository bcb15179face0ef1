//! # External SDRAM diagnostic engine
//!
//! Exercises a fixed-size external RAM bank one byte at a time. Every pass
//! covers the whole region in ascending offset order:
//!
//! - **fill**: store `(base + offset) mod 256` at every offset
//! - **erase**: store 0 at every offset
//! - **verify**: compare every byte against the fill pattern and stop at the
//!   first difference
//! - **read sweep**: load every byte once, only to measure read latency
//!
//! Because the pattern is a pure function of `base` and the offset, a verify
//! needs no reference copy of the data.
//!
//! The engine also drives the memory controller between normal operation and
//! self-refresh, busy-polling the controller until it confirms the new mode.
//!
//! # Example
//!
//! ```rust
//! # use core::cell::Cell;
//! use sdramdiag::sdram::{Error, Mode, ModeControl, Sdram, Target};
//! use sdramdiag::storage::{SliceRegion, Storage};
//! use sdramdiag::timing::Clock;
//! # struct Ticks(Cell<u32>);
//! # impl Clock for Ticks {
//! #     fn now(&self) -> u32 { let t = self.0.get(); self.0.set(t + 1000); t }
//! #     fn frequency(&self) -> u32 { 1_000_000 }
//! # }
//! # struct Fmc(Mode);
//! # impl ModeControl for Fmc {
//! #     fn command(&mut self, target: Target) { self.0 = target.mode(); }
//! #     fn is_busy(&mut self) -> bool { false }
//! #     fn mode(&mut self) -> Mode { self.0 }
//! # }
//!
//! let mut bank = vec![0u8; 4096];
//! let mut sdram = Sdram::new(SliceRegion::new(&mut bank), Ticks(Cell::new(0)), Fmc(Mode::Normal));
//!
//! sdram.fill(0x3C).unwrap();
//! sdram.verify(0x3C).unwrap();
//!
//! sdram.region_mut().write_byte(100, 0).unwrap();
//! match sdram.verify(0x3C) {
//!     Err(Error::Mismatch(m)) => assert_eq!(m.offset, 100),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

#![deny(unsafe_code)]

mod controller;
/// Error types for diagnostic operations
pub mod error;

pub use controller::{Mode, ModeControl, ModeState, Target};
pub use error::{Error, Mismatch};

use crate::storage::{self, Storage};
use crate::timing::{self, Clock};

/// Size of the IS42S16400J part fitted to the STM32F429I-DISCO board.
pub const IS42S16400J_SIZE: usize = 0x40_0000;

/// Busy-poll limit used by the vendor's FMC driver.
pub const DEFAULT_POLL_LIMIT: u32 = 0xFFFF;

/// Pattern byte stored at `offset` for a given `base`.
#[inline]
pub fn pattern_byte(base: u8, offset: u32) -> u8 {
    base.wrapping_add(offset as u8)
}

/// Timings of one complete write/read/check exercise, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExerciseReport {
    /// Filling the region with the pattern.
    pub write_ms: u32,
    /// Reading every byte without checking.
    pub read_ms: u32,
    /// Reading every byte and checking it against the pattern.
    pub check_ms: u32,
}

impl ExerciseReport {
    /// Sum of all three passes.
    pub fn total_ms(&self) -> u32 {
        self.write_ms
            .saturating_add(self.read_ms)
            .saturating_add(self.check_ms)
    }
}

/// The diagnostic engine: one memory region, the clock used to time passes
/// over it, and the controller that owns its power mode.
#[derive(Debug)]
pub struct Sdram<R, K, M> {
    region: R,
    clock: K,
    controller: M,
    state: ModeState,
    poll_limit: Option<u32>,
}

impl<R, K, M> Sdram<R, K, M>
where
    R: Storage<Error = storage::Error>,
    K: Clock,
    M: ModeControl,
{
    /// Build an engine with the default busy-poll limit.
    pub fn new(region: R, clock: K, controller: M) -> Self {
        Self {
            region,
            clock,
            controller,
            state: ModeState::Unknown,
            poll_limit: Some(DEFAULT_POLL_LIMIT),
        }
    }

    /// Bound the controller busy-poll to `limit` polls, or poll forever with
    /// `None`.
    pub fn with_poll_limit(mut self, limit: Option<u32>) -> Self {
        self.poll_limit = limit;
        self
    }

    /// Region size in bytes.
    pub fn size(&self) -> usize {
        self.region.capacity()
    }

    /// Shared access to the region.
    pub fn region(&self) -> &R {
        &self.region
    }

    /// Direct access to the region, e.g. to inject faults.
    pub fn region_mut(&mut self) -> &mut R {
        &mut self.region
    }

    /// The clock used for timing.
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// The memory controller.
    pub fn controller(&self) -> &M {
        &self.controller
    }

    /// Direct access to the memory controller.
    pub fn controller_mut(&mut self) -> &mut M {
        &mut self.controller
    }

    /// Mode confirmed by the last transition.
    pub fn mode_state(&self) -> ModeState {
        self.state
    }

    /// Store the pattern for `base` across the whole region.
    pub fn fill(&mut self, base: u8) -> Result<(), Error> {
        fill_pass(&mut self.region, base)
    }

    /// Store zero across the whole region.
    pub fn erase(&mut self) -> Result<(), Error> {
        erase_pass(&mut self.region)
    }

    /// Check the whole region against the pattern for `base`.
    ///
    /// The scan runs in ascending order and returns at the first differing
    /// byte; nothing past it is read.
    pub fn verify(&mut self, base: u8) -> Result<(), Error> {
        verify_pass(&mut self.region, base)
    }

    /// Load every byte once without looking at it.
    pub fn read_sweep(&mut self) -> Result<(), Error> {
        sweep_pass(&mut self.region)
    }

    /// [`fill`](Self::fill), returning the elapsed milliseconds.
    pub fn fill_timed(&mut self, base: u8) -> Result<u32, Error> {
        timed_pass(&self.clock, || fill_pass(&mut self.region, base))
    }

    /// [`erase`](Self::erase), returning the elapsed milliseconds.
    pub fn erase_timed(&mut self) -> Result<u32, Error> {
        timed_pass(&self.clock, || erase_pass(&mut self.region))
    }

    /// [`verify`](Self::verify), returning the elapsed milliseconds.
    pub fn verify_timed(&mut self, base: u8) -> Result<u32, Error> {
        timed_pass(&self.clock, || verify_pass(&mut self.region, base))
    }

    /// [`read_sweep`](Self::read_sweep), returning the elapsed milliseconds.
    pub fn read_sweep_timed(&mut self) -> Result<u32, Error> {
        timed_pass(&self.clock, || sweep_pass(&mut self.region))
    }

    /// Fill, sweep and verify with the same `base`, timing each pass.
    pub fn exercise(&mut self, base: u8) -> Result<ExerciseReport, Error> {
        let write_ms = self.fill_timed(base)?;
        let read_ms = self.read_sweep_timed()?;
        let check_ms = self.verify_timed(base)?;
        Ok(ExerciseReport {
            write_ms,
            read_ms,
            check_ms,
        })
    }

    /// Request `target` from the controller and wait for it to confirm.
    ///
    /// The command is always issued and the busy flag always polled, even
    /// when the last confirmed state already equals `target`.
    pub fn mode_transition(&mut self, target: Target) -> Result<(), Error> {
        debug!("mode transition to {=str}", target.name());
        self.controller.command(target);

        let mut polls: u32 = 0;
        while self.controller.is_busy() {
            polls = polls.saturating_add(1);
            if self.poll_limit.is_some_and(|limit| polls >= limit) {
                self.state = ModeState::Unknown;
                error!("controller still busy after {=u32} polls", polls);
                return Err(Error::Timeout);
            }
        }

        let actual = self.controller.mode();
        if actual != target.mode() {
            self.state = ModeState::Unknown;
            return Err(Error::NotConfirmed { target, actual });
        }
        self.state = target.into();
        Ok(())
    }
}

/// Number of offsets a pass covers. Every offset must be addressable as a
/// `u32`, so regions of 4 GiB and more are rejected.
fn span<R: Storage<Error = storage::Error>>(region: &R) -> Result<u32, Error> {
    u32::try_from(region.capacity()).map_err(|_| Error::Storage(storage::Error::OutOfBounds))
}

fn fill_pass<R: Storage<Error = storage::Error>>(region: &mut R, base: u8) -> Result<(), Error> {
    for offset in 0..span(region)? {
        region.write_byte(offset, pattern_byte(base, offset))?;
    }
    Ok(())
}

fn erase_pass<R: Storage<Error = storage::Error>>(region: &mut R) -> Result<(), Error> {
    for offset in 0..span(region)? {
        region.write_byte(offset, 0)?;
    }
    Ok(())
}

fn verify_pass<R: Storage<Error = storage::Error>>(region: &mut R, base: u8) -> Result<(), Error> {
    for offset in 0..span(region)? {
        let expected = pattern_byte(base, offset);
        let actual = region.read_byte(offset)?;
        if actual != expected {
            warn!("verify mismatch at {=u32}", offset);
            return Err(Mismatch {
                offset,
                expected,
                actual,
            }
            .into());
        }
    }
    Ok(())
}

fn sweep_pass<R: Storage<Error = storage::Error>>(region: &mut R) -> Result<(), Error> {
    for offset in 0..span(region)? {
        core::hint::black_box(region.read_byte(offset)?);
    }
    Ok(())
}

/// Run one pass under [`timing::timed`], keeping its error.
fn timed_pass<K: Clock>(clock: &K, pass: impl FnOnce() -> Result<(), Error>) -> Result<u32, Error> {
    let (result, ms) = timing::timed(clock, pass);
    result.map(|()| ms)
}

#[cfg(test)]
mod tests;
